//! Read-only connection to a JSON-RPC node, one provider per chain.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use web3_connect_core::{
    ActivationRequest, Actions, Connector, ConnectorCapabilities, ConnectorKind, Eip1193Provider,
    StateUpdate, Web3Error,
};

use crate::config::ConnectorConfig;
use crate::json_rpc::JsonRpcProvider;
use crate::wallet;

#[derive(Debug, Default)]
struct NetworkState {
    providers: HashMap<u64, Arc<JsonRpcProvider>>,
    current: Option<Arc<JsonRpcProvider>>,
}

pub struct Network {
    actions: Actions,
    url_map: BTreeMap<u64, Vec<String>>,
    default_chain_id: u64,
    timeout_ms: u64,
    state: Mutex<NetworkState>,
}

impl Network {
    /// `default_chain_id` falls back to the lowest chain in `url_map`.
    pub fn new(
        actions: Actions,
        url_map: BTreeMap<u64, Vec<String>>,
        default_chain_id: Option<u64>,
        timeout_ms: u64,
    ) -> Result<Self, Web3Error> {
        let default_chain_id = match default_chain_id {
            Some(chain_id) => chain_id,
            None => *url_map
                .keys()
                .next()
                .ok_or_else(|| Web3Error::Validation("network needs at least one url".to_owned()))?,
        };
        Ok(Self {
            actions,
            url_map,
            default_chain_id,
            timeout_ms,
            state: Mutex::new(NetworkState::default()),
        })
    }

    pub fn from_config(actions: Actions, config: &ConnectorConfig) -> Result<Self, Web3Error> {
        Self::new(
            actions,
            config.rpc_urls.clone(),
            config.default_chain_id,
            config.rpc_timeout_ms,
        )
    }

    pub fn default_chain_id(&self) -> u64 {
        self.default_chain_id
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, NetworkState>, Web3Error> {
        self.state
            .lock()
            .map_err(|e| Web3Error::Transport(format!("network lock poisoned: {e}")))
    }

    fn cached(&self, chain_id: u64) -> Result<Option<Arc<JsonRpcProvider>>, Web3Error> {
        Ok(self.lock_state()?.providers.get(&chain_id).cloned())
    }

    fn provider_for(&self, chain_id: u64) -> Result<Arc<JsonRpcProvider>, Web3Error> {
        let mut g = self.lock_state()?;
        if let Some(provider) = g.providers.get(&chain_id) {
            return Ok(Arc::clone(provider));
        }
        let urls = self
            .url_map
            .get(&chain_id)
            .ok_or(Web3Error::UnsupportedChain(chain_id))?;
        let provider = Arc::new(JsonRpcProvider::new(urls.clone(), self.timeout_ms)?);
        g.providers.insert(chain_id, Arc::clone(&provider));
        Ok(provider)
    }

    async fn connect(&self, chain_id: u64) -> Result<(), Web3Error> {
        let provider = self.provider_for(chain_id)?;
        let reported = wallet::chain_id(&*provider).await?;
        if reported != chain_id {
            return Err(Web3Error::NetworkMismatch {
                expected: chain_id,
                actual: reported,
            });
        }
        self.lock_state()?.current = Some(provider);
        self.actions
            .update(StateUpdate::connected(reported, Vec::<String>::new()))
    }
}

#[async_trait]
impl Connector for Network {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Network
    }

    fn capabilities(&self) -> ConnectorCapabilities {
        ConnectorCapabilities {
            supports_chain_switch: true,
            ..ConnectorCapabilities::default()
        }
    }

    fn custom_provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        let current = self.state.lock().ok()?.current.clone()?;
        Some(current as Arc<dyn Eip1193Provider>)
    }

    /// Connects to `request`'s chain, or the default one. Switching to a
    /// chain whose provider is already cached does not enter the activating
    /// state.
    async fn activate(&self, request: ActivationRequest) -> Result<(), Web3Error> {
        let chain_id = request.desired_chain_id().unwrap_or(self.default_chain_id);
        let cancel = match self.cached(chain_id)? {
            Some(_) => None,
            None => Some(self.actions.start_activation()),
        };
        let result = self.connect(chain_id).await;
        if let Err(e) = &result {
            tracing::warn!(chain_id, error = %e, "network activation failed");
            if let Some(cancel) = cancel {
                cancel.cancel();
            }
        }
        result
    }

    async fn connect_eagerly(&self) -> Result<(), Web3Error> {
        let chain_id = self.default_chain_id;
        let cancel = self.actions.start_activation();
        if let Err(e) = self.connect(chain_id).await {
            tracing::debug!(chain_id, error = %e, "could not connect eagerly");
            cancel.cancel();
        }
        Ok(())
    }
}
