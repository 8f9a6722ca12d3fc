use async_trait::async_trait;

use web3_connect_core::{
    create_store_and_actions, ActivationRequest, Actions, Connector, ConnectorKind, Web3Error,
};

/// A connector that never connects. Useful as a placeholder while no wallet
/// is chosen.
#[derive(Debug, Clone)]
pub struct Empty {
    actions: Actions,
}

impl Empty {
    /// An empty connector with its own detached store.
    pub fn new() -> Self {
        let (_, actions) = create_store_and_actions();
        Self { actions }
    }

    pub fn with_actions(actions: Actions) -> Self {
        Self { actions }
    }
}

impl Default for Empty {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for Empty {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Empty
    }

    async fn activate(&self, _request: ActivationRequest) -> Result<(), Web3Error> {
        Ok(())
    }

    async fn deactivate(&self) -> Result<(), Web3Error> {
        Ok(())
    }

    fn reset_state(&self) {}
}
