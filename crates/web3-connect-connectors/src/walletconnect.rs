//! WalletConnect sessions through a client port.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use web3_connect_core::{
    ActivationRequest, Actions, Connector, ConnectorCapabilities, ConnectorKind, Eip1193Provider,
    ErrorHandler, ProviderRpcError, StateUpdate, Web3Error,
};

use crate::wallet;

/// A WalletConnect session client. Requests made through the
/// [`Eip1193Provider`] side are relayed to the paired wallet.
#[async_trait]
pub trait WalletConnectClient: Eip1193Provider {
    /// Whether a session is established.
    fn connected(&self) -> bool;

    /// Opens a session (showing the pairing URI to the user) and returns the
    /// approved accounts.
    async fn enable(&self) -> Result<Vec<String>, ProviderRpcError>;

    async fn disconnect(&self) -> Result<(), ProviderRpcError>;
}

#[derive(Debug, Clone, Default)]
pub struct WalletConnectOptions {
    /// RPC endpoints the session may use, per chain.
    pub rpc: BTreeMap<u64, Vec<String>>,
}

pub struct WalletConnect<C> {
    actions: Actions,
    client: Arc<C>,
    options: WalletConnectOptions,
}

impl<C: WalletConnectClient + 'static> WalletConnect<C> {
    pub fn new(
        actions: Actions,
        client: Arc<C>,
        options: WalletConnectOptions,
        on_error: Option<ErrorHandler>,
    ) -> Self {
        wallet::listen(&*client, actions.clone(), on_error);
        Self {
            actions,
            client,
            options,
        }
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    fn check_chain(&self, chain_id: Option<u64>) -> Result<(), Web3Error> {
        match chain_id {
            Some(chain_id)
                if !self.options.rpc.is_empty() && !self.options.rpc.contains_key(&chain_id) =>
            {
                Err(Web3Error::UnsupportedChain(chain_id))
            }
            _ => Ok(()),
        }
    }

    async fn open_session(&self, request: &ActivationRequest) -> Result<(), Web3Error> {
        let accounts = self.client.enable().await?;
        wallet::settle_chain(&*self.client, &self.actions, request, accounts).await
    }

    async fn restore_session(&self) -> Result<(), Web3Error> {
        if !self.client.connected() {
            return Err(Web3Error::Transport("no walletconnect session".to_owned()));
        }
        let accounts = wallet::accounts(&*self.client).await?;
        let chain_id = wallet::chain_id(&*self.client).await?;
        self.actions
            .update(StateUpdate::connected(chain_id, accounts))
    }
}

#[async_trait]
impl<C: WalletConnectClient + 'static> Connector for WalletConnect<C> {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::WalletConnect
    }

    fn capabilities(&self) -> ConnectorCapabilities {
        ConnectorCapabilities {
            supports_chain_switch: true,
            accepts_chain_parameters: false,
            requires_explicit_disconnect: true,
            supports_watch_asset: false,
        }
    }

    fn provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        Some(Arc::clone(&self.client) as Arc<dyn Eip1193Provider>)
    }

    async fn connect_eagerly(&self) -> Result<(), Web3Error> {
        let cancel = self.actions.start_activation();
        if let Err(e) = self.restore_session().await {
            tracing::debug!(error = %e, "could not connect eagerly");
            cancel.cancel();
        }
        Ok(())
    }

    /// With a live session only the chain is switched; otherwise a new
    /// session is opened.
    async fn activate(&self, request: ActivationRequest) -> Result<(), Web3Error> {
        let desired = request.desired_chain_id();
        self.check_chain(desired)?;

        if self.client.connected() {
            let current = wallet::chain_id(&*self.client).await?;
            return match desired {
                Some(desired) if desired != current => {
                    wallet::switch_chain(&*self.client, desired, None).await
                }
                _ => Ok(()),
            };
        }

        let cancel = self.actions.start_activation();
        let result = self.open_session(&request).await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "walletconnect activation failed");
            cancel.cancel();
        }
        result
    }

    async fn deactivate(&self) -> Result<(), Web3Error> {
        let result = self.client.disconnect().await;
        self.actions.reset_state();
        result.map_err(Web3Error::from)
    }
}
