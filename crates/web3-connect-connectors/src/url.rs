use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use web3_connect_core::{
    ActivationRequest, Actions, Connector, ConnectorKind, Eip1193Provider, StateUpdate, Web3Error,
};

use crate::json_rpc::JsonRpcProvider;
use crate::wallet;

/// Read-only connection to a single JSON-RPC endpoint. The chain is whatever
/// the endpoint reports.
pub struct Url {
    actions: Actions,
    url: String,
    timeout_ms: u64,
    provider: Mutex<Option<Arc<JsonRpcProvider>>>,
}

impl Url {
    pub fn new(actions: Actions, url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            actions,
            url: url.into(),
            timeout_ms,
            provider: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn current(&self) -> Option<Arc<JsonRpcProvider>> {
        self.provider.lock().ok().and_then(|g| g.clone())
    }

    async fn connect(&self) -> Result<(), Web3Error> {
        let provider = match self.current() {
            Some(provider) => provider,
            None => {
                let provider = JsonRpcProvider::new(vec![self.url.clone()], self.timeout_ms)?;
                let mut g = self
                    .provider
                    .lock()
                    .map_err(|e| Web3Error::Transport(format!("url lock poisoned: {e}")))?;
                Arc::clone(g.get_or_insert_with(|| Arc::new(provider)))
            }
        };
        let chain_id = wallet::chain_id(&*provider).await?;
        self.actions
            .update(StateUpdate::connected(chain_id, Vec::<String>::new()))
    }
}

#[async_trait]
impl Connector for Url {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Url
    }

    fn custom_provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        self.current().map(|p| p as Arc<dyn Eip1193Provider>)
    }

    async fn activate(&self, _request: ActivationRequest) -> Result<(), Web3Error> {
        let cancel = match self.current() {
            Some(_) => None,
            None => Some(self.actions.start_activation()),
        };
        let result = self.connect().await;
        if let Err(e) = &result {
            tracing::warn!(url = %self.url, error = %e, "url activation failed");
            if let Some(cancel) = cancel {
                cancel.cancel();
            }
        }
        result
    }

    async fn connect_eagerly(&self) -> Result<(), Web3Error> {
        let cancel = self.actions.start_activation();
        if let Err(e) = self.connect().await {
            tracing::debug!(url = %self.url, error = %e, "could not connect eagerly");
            cancel.cancel();
        }
        Ok(())
    }
}
