use std::sync::Arc;

use async_trait::async_trait;

use web3_connect_core::{
    ActivationRequest, Actions, Connector, ConnectorKind, Eip1193Provider, ErrorHandler,
    ProviderRpcError, StateUpdate, Web3Error,
};

use crate::wallet;

/// Connector over any EIP-1193 provider handed in by the caller.
pub struct Eip1193 {
    actions: Actions,
    provider: Arc<dyn Eip1193Provider>,
}

impl Eip1193 {
    pub fn new(
        actions: Actions,
        provider: Arc<dyn Eip1193Provider>,
        on_error: Option<ErrorHandler>,
    ) -> Self {
        wallet::listen(&*provider, actions.clone(), on_error);
        Self { actions, provider }
    }

    async fn read_connection(&self, prompt: bool) -> Result<(u64, Vec<String>), Web3Error> {
        let chain_id = wallet::chain_id(&*self.provider).await?;
        let accounts = if prompt {
            match wallet::request_accounts(&*self.provider).await {
                Err(Web3Error::Rpc(e))
                    if e.code == ProviderRpcError::UNAUTHORIZED
                        || e.code == ProviderRpcError::UNSUPPORTED_METHOD =>
                {
                    wallet::accounts(&*self.provider).await?
                }
                other => other?,
            }
        } else {
            wallet::accounts(&*self.provider).await?
        };
        Ok((chain_id, accounts))
    }
}

#[async_trait]
impl Connector for Eip1193 {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Eip1193
    }

    fn provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        Some(Arc::clone(&self.provider))
    }

    async fn connect_eagerly(&self) -> Result<(), Web3Error> {
        let cancel = self.actions.start_activation();
        let result = match self.read_connection(false).await {
            Ok((_, accounts)) if accounts.is_empty() => Err(Web3Error::NoAccounts),
            Ok((chain_id, accounts)) => self
                .actions
                .update(StateUpdate::connected(chain_id, accounts)),
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            tracing::debug!(error = %e, "could not connect eagerly");
            cancel.cancel();
        }
        Ok(())
    }

    async fn activate(&self, _request: ActivationRequest) -> Result<(), Web3Error> {
        let cancel = self.actions.start_activation();
        let result = match self.read_connection(true).await {
            Ok((chain_id, accounts)) => self
                .actions
                .update(StateUpdate::connected(chain_id, accounts)),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            tracing::warn!(error = %e, "eip-1193 activation failed");
            cancel.cancel();
        }
        result
    }
}
