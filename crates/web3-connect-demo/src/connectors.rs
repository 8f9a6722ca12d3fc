//! The connectors shown by the demo, built from the environment.

use std::sync::Arc;

use web3_connect_connectors::{chains, ConnectorConfig, Empty, Injected, JsonRpcProvider, Network};
use web3_connect_core::{
    initialize_connector, try_initialize_connector, Eip1193Provider, ErrorHandler,
    InitializedConnector, Web3Error,
};

/// Injected wallet (reached through the EIP-1193 proxy when one is
/// configured), a read-only network connector and an empty placeholder.
pub fn build(config: &ConnectorConfig) -> Vec<InitializedConnector> {
    let injected_provider = config.eip1193_proxy_url.as_ref().and_then(|url| {
        match JsonRpcProvider::new(vec![url.clone()], config.rpc_timeout_ms) {
            Ok(provider) => Some(Arc::new(provider) as Arc<dyn Eip1193Provider>),
            Err(e) => {
                tracing::warn!(error = %e, "eip1193 proxy unavailable");
                None
            }
        }
    });
    let on_error: ErrorHandler = Arc::new(|e: &Web3Error| tracing::warn!(error = %e, "wallet error"));

    let mut list: Vec<InitializedConnector> = vec![initialize_connector(|actions| {
        Injected::new(actions, injected_provider, Some(on_error))
    })
    .into()];

    match try_initialize_connector(|actions| {
        Network::new(
            actions,
            chains::urls(config),
            config.default_chain_id,
            config.rpc_timeout_ms,
        )
    }) {
        Ok(network) => list.push(network.into()),
        Err(e) => tracing::warn!(error = %e, "network connector disabled"),
    }

    list.push(initialize_connector(Empty::with_actions).into());
    list
}
