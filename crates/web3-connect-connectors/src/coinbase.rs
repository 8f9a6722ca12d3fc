//! Coinbase Wallet through its SDK port.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use serde_json::Value;

use web3_connect_core::{
    ActivationRequest, Actions, Connector, ConnectorCapabilities, ConnectorKind, Eip1193Provider,
    ErrorHandler, StateUpdate, WatchAssetParameters, Web3Error,
};

use crate::wallet;

pub trait CoinbaseWalletSdk: Send + Sync {
    type Provider: Eip1193Provider + 'static;

    /// Builds the wallet's provider, using `url` for read-only requests.
    fn make_web3_provider(&self, url: &str) -> Self::Provider;

    /// Ends the wallet session.
    fn disconnect(&self);
}

#[derive(Debug, Clone)]
pub struct CoinbaseWalletOptions {
    pub app_name: String,
    pub url: String,
}

pub struct CoinbaseWallet<S: CoinbaseWalletSdk> {
    actions: Actions,
    sdk: S,
    options: CoinbaseWalletOptions,
    on_error: Option<ErrorHandler>,
    provider: OnceLock<Arc<S::Provider>>,
}

impl<S: CoinbaseWalletSdk> CoinbaseWallet<S> {
    pub fn new(
        actions: Actions,
        sdk: S,
        options: CoinbaseWalletOptions,
        on_error: Option<ErrorHandler>,
    ) -> Self {
        Self {
            actions,
            sdk,
            options,
            on_error,
            provider: OnceLock::new(),
        }
    }

    pub fn options(&self) -> &CoinbaseWalletOptions {
        &self.options
    }

    pub fn sdk(&self) -> &S {
        &self.sdk
    }

    /// The provider, created and wired to the store on first use.
    fn wallet_provider(&self) -> &Arc<S::Provider> {
        self.provider.get_or_init(|| {
            tracing::debug!(app = %self.options.app_name, "creating coinbase wallet provider");
            let provider = Arc::new(self.sdk.make_web3_provider(&self.options.url));
            wallet::listen(&*provider, self.actions.clone(), self.on_error.clone());
            provider
        })
    }

    async fn reconnect(&self) -> Result<(), Web3Error> {
        let provider = self.wallet_provider();
        let accounts = wallet::accounts(&**provider).await?;
        if accounts.is_empty() {
            return Err(Web3Error::Transport("no existing connection".to_owned()));
        }
        let chain_id = wallet::chain_id(&**provider).await?;
        self.actions
            .update(StateUpdate::connected(chain_id, accounts))
    }

    async fn connect(&self, request: &ActivationRequest) -> Result<(), Web3Error> {
        let provider = self.wallet_provider();
        let accounts = wallet::request_accounts(&**provider).await?;
        wallet::settle_chain(&**provider, &self.actions, request, accounts).await
    }
}

#[async_trait]
impl<S: CoinbaseWalletSdk> Connector for CoinbaseWallet<S> {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::CoinbaseWallet
    }

    fn capabilities(&self) -> ConnectorCapabilities {
        ConnectorCapabilities {
            supports_chain_switch: true,
            accepts_chain_parameters: true,
            requires_explicit_disconnect: true,
            supports_watch_asset: true,
        }
    }

    fn provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        self.provider
            .get()
            .map(|p| Arc::clone(p) as Arc<dyn Eip1193Provider>)
    }

    async fn connect_eagerly(&self) -> Result<(), Web3Error> {
        let cancel = self.actions.start_activation();
        if let Err(e) = self.reconnect().await {
            tracing::debug!(error = %e, "could not connect eagerly");
            cancel.cancel();
        }
        Ok(())
    }

    async fn activate(&self, request: ActivationRequest) -> Result<(), Web3Error> {
        let connected = match self.provider.get() {
            Some(provider) => !wallet::accounts(&**provider).await?.is_empty(),
            None => false,
        };
        let cancel = (!connected).then(|| self.actions.start_activation());
        let result = self.connect(&request).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "coinbase wallet activation failed");
            if let Some(cancel) = cancel {
                cancel.cancel();
            }
        }
        result
    }

    async fn deactivate(&self) -> Result<(), Web3Error> {
        self.sdk.disconnect();
        self.actions.reset_state();
        Ok(())
    }

    async fn watch_asset(&self, asset: WatchAssetParameters) -> Result<bool, Web3Error> {
        let provider = self.wallet_provider();
        let result = provider
            .request("wallet_watchAsset", asset.to_rpc_value())
            .await?;
        match result {
            Value::Bool(true) => Ok(true),
            _ => Err(Web3Error::Validation("wallet_watchAsset rejected".to_owned())),
        }
    }
}
