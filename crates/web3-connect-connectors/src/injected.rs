//! MetaMask-style injected wallets.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use web3_connect_core::{
    ActivationRequest, Actions, Connector, ConnectorCapabilities, ConnectorKind, Eip1193Provider,
    ErrorHandler, StateUpdate, WatchAssetParameters, Web3Error,
};

use crate::wallet;

pub struct Injected {
    actions: Actions,
    provider: Option<Arc<dyn Eip1193Provider>>,
}

impl Injected {
    /// `provider` is whatever the host injected, if anything. Event
    /// listeners are attached right away.
    pub fn new(
        actions: Actions,
        provider: Option<Arc<dyn Eip1193Provider>>,
        on_error: Option<ErrorHandler>,
    ) -> Self {
        if let Some(provider) = &provider {
            wallet::listen(&**provider, actions.clone(), on_error);
        }
        Self { actions, provider }
    }

    fn require_provider(&self) -> Result<&Arc<dyn Eip1193Provider>, Web3Error> {
        self.provider
            .as_ref()
            .ok_or(Web3Error::NoProvider(ConnectorKind::Injected.display_name()))
    }

    async fn connect(&self, request: &ActivationRequest) -> Result<(), Web3Error> {
        let provider = self.require_provider()?;
        let accounts = wallet::request_accounts(&**provider).await?;
        wallet::settle_chain(&**provider, &self.actions, request, accounts).await
    }

    async fn reconnect(&self) -> Result<(), Web3Error> {
        let provider = self.require_provider()?;
        let accounts = wallet::accounts(&**provider).await?;
        if accounts.is_empty() {
            return Err(Web3Error::NoAccounts);
        }
        let chain_id = wallet::chain_id(&**provider).await?;
        self.actions
            .update(StateUpdate::connected(chain_id, accounts))
    }
}

#[async_trait]
impl Connector for Injected {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Injected
    }

    fn capabilities(&self) -> ConnectorCapabilities {
        ConnectorCapabilities {
            supports_chain_switch: true,
            accepts_chain_parameters: true,
            requires_explicit_disconnect: false,
            supports_watch_asset: true,
        }
    }

    fn provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        self.provider.clone()
    }

    async fn connect_eagerly(&self) -> Result<(), Web3Error> {
        let cancel = self.actions.start_activation();
        if let Err(e) = self.reconnect().await {
            tracing::debug!(error = %e, "could not connect eagerly");
            cancel.cancel();
        }
        Ok(())
    }

    /// Prompts for accounts and, when a chain is requested, switches to it.
    /// An already connected provider keeps the store out of the activating
    /// state while it switches.
    async fn activate(&self, request: ActivationRequest) -> Result<(), Web3Error> {
        let cancel = match &self.provider {
            Some(provider) if provider.is_connected() => None,
            _ => Some(self.actions.start_activation()),
        };
        let result = self.connect(&request).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "activation failed");
            if let Some(cancel) = cancel {
                cancel.cancel();
            }
        }
        result
    }

    async fn watch_asset(&self, asset: WatchAssetParameters) -> Result<bool, Web3Error> {
        let provider = self.require_provider()?;
        let result = provider
            .request("wallet_watchAsset", asset.to_rpc_value())
            .await?;
        match result {
            Value::Bool(true) => Ok(true),
            _ => Err(Web3Error::Validation("wallet_watchAsset rejected".to_owned())),
        }
    }
}
