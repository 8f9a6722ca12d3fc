//! Connection from inside a Safe App iframe.

use std::sync::{Arc, OnceLock};

use alloy::primitives::Address;
use async_trait::async_trait;

use web3_connect_core::{
    ActivationRequest, Actions, Connector, ConnectorKind, Eip1193Provider, StateUpdate, Web3Error,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafeInfo {
    pub safe_address: Address,
    pub chain_id: u64,
}

/// The Safe Apps SDK as seen from the embedded app.
#[async_trait]
pub trait SafeAppsSdk: Send + Sync {
    /// Whether the app runs embedded in the Safe interface.
    fn in_safe_context(&self) -> bool;

    /// Queries the surrounding Safe. Outside a Safe the SDK never answers,
    /// so implementations time out.
    async fn safe_info(&self) -> Result<SafeInfo, Web3Error>;

    fn provider(&self, info: &SafeInfo) -> Arc<dyn Eip1193Provider>;
}

pub struct GnosisSafe<S> {
    actions: Actions,
    sdk: S,
    provider: OnceLock<Arc<dyn Eip1193Provider>>,
}

impl<S: SafeAppsSdk> GnosisSafe<S> {
    pub fn new(actions: Actions, sdk: S) -> Self {
        Self {
            actions,
            sdk,
            provider: OnceLock::new(),
        }
    }

    async fn connect(&self) -> Result<(), Web3Error> {
        if !self.sdk.in_safe_context() {
            return Err(Web3Error::NoSafeContext);
        }
        let info = self.sdk.safe_info().await?;
        self.provider.get_or_init(|| self.sdk.provider(&info));
        self.actions.update(StateUpdate::connected(
            info.chain_id,
            [info.safe_address.to_checksum(None)],
        ))
    }
}

#[async_trait]
impl<S: SafeAppsSdk> Connector for GnosisSafe<S> {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::GnosisSafe
    }

    fn provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        self.provider.get().cloned()
    }

    async fn connect_eagerly(&self) -> Result<(), Web3Error> {
        let cancel = self.actions.start_activation();
        if let Err(e) = self.connect().await {
            tracing::debug!(error = %e, "could not connect eagerly");
            cancel.cancel();
        }
        Ok(())
    }

    /// The Safe decides the chain; a requested chain is ignored.
    async fn activate(&self, _request: ActivationRequest) -> Result<(), Web3Error> {
        if !self.sdk.in_safe_context() {
            return Err(Web3Error::NoSafeContext);
        }
        let cancel = self.actions.start_activation();
        let result = self.connect().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "safe activation failed");
            cancel.cancel();
        }
        result
    }
}
