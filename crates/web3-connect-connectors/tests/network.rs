mod common;

use std::collections::BTreeMap;

use serde_json::json;
use web3_connect_connectors::{ConnectorConfig, Network, Url};
use web3_connect_core::{
    create_store_and_actions, ActivationRequest, ConnectionState, Connector, Web3Error,
};

use common::spawn_rpc_server;

fn chain_server(chain: &'static str) -> String {
    spawn_rpc_server(move |method| match method {
        "eth_chainId" => Ok(json!(chain)),
        _ => Err(json!({"code": 4200, "message": "unsupported"})),
    })
    .0
}

#[tokio::test]
async fn network_activates_default_chain() {
    let (store, actions) = create_store_and_actions();
    let url_map = BTreeMap::from([
        (1, vec![chain_server("0x1")]),
        (10, vec![chain_server("0xa")]),
    ]);
    let connector = Network::new(actions, url_map, None, 5_000).expect("network");
    assert_eq!(connector.default_chain_id(), 1);
    assert!(connector.custom_provider().is_none());

    connector
        .activate(ActivationRequest::Default)
        .await
        .expect("activate");
    assert_eq!(
        store.state(),
        ConnectionState {
            chain_id: Some(1),
            accounts: Some(vec![]),
            activating: false,
        }
    );
    assert!(connector.custom_provider().is_some());

    connector
        .activate(ActivationRequest::Chain(10))
        .await
        .expect("switch");
    assert_eq!(store.state().chain_id, Some(10));
}

#[tokio::test]
async fn network_rejects_unconfigured_chain() {
    let (store, actions) = create_store_and_actions();
    let url_map = BTreeMap::from([(1, vec![chain_server("0x1")])]);
    let connector = Network::new(actions, url_map, None, 5_000).expect("network");

    let err = connector
        .activate(ActivationRequest::Chain(5))
        .await
        .expect_err("unsupported");
    assert!(matches!(err, Web3Error::UnsupportedChain(5)));
    assert!(!store.state().activating);
}

#[tokio::test]
async fn network_reports_mismatched_node() {
    let (store, actions) = create_store_and_actions();
    let url_map = BTreeMap::from([(1, vec![chain_server("0x5")])]);
    let connector = Network::new(actions, url_map, None, 5_000).expect("network");

    let err = connector
        .activate(ActivationRequest::Default)
        .await
        .expect_err("mismatch");
    assert!(matches!(
        err,
        Web3Error::NetworkMismatch {
            expected: 1,
            actual: 5
        }
    ));
    assert!(!store.state().activating);
}

#[test]
fn network_needs_urls() {
    let (_, actions) = create_store_and_actions();
    assert!(Network::from_config(actions, &ConnectorConfig::default()).is_err());
}

#[tokio::test]
async fn network_from_config_uses_default_chain() {
    let (store, actions) = create_store_and_actions();
    let mut config = ConnectorConfig::default();
    config.rpc_urls.insert(1, vec![chain_server("0x1")]);
    config.rpc_urls.insert(137, vec![chain_server("0x89")]);
    config.default_chain_id = Some(137);
    let connector = Network::from_config(actions, &config).expect("network");

    connector.connect_eagerly().await.expect("eager");
    assert_eq!(store.state().chain_id, Some(137));
}

#[tokio::test]
async fn url_connector_uses_reported_chain() {
    let (store, actions) = create_store_and_actions();
    let connector = Url::new(actions, chain_server("0x1"), 5_000);
    assert!(connector.custom_provider().is_none());

    connector
        .activate(ActivationRequest::Default)
        .await
        .expect("activate");
    assert_eq!(
        store.state(),
        ConnectionState {
            chain_id: Some(1),
            accounts: Some(vec![]),
            activating: false,
        }
    );
    assert!(connector.custom_provider().is_some());
}

#[tokio::test]
async fn url_connector_cancels_on_unreachable_node() {
    let (store, actions) = create_store_and_actions();
    let connector = Url::new(actions, "http://127.0.0.1:1", 1_000);
    assert!(connector.activate(ActivationRequest::Default).await.is_err());
    assert!(!store.state().activating);
}

#[tokio::test]
async fn network_eager_failure_is_swallowed() {
    let (store, actions) = create_store_and_actions();
    let url_map = BTreeMap::from([(1, vec![chain_server("0xa")])]);
    let connector = Network::new(actions, url_map, None, 5_000).expect("network");

    connector.connect_eagerly().await.expect("eager never fails");
    assert_eq!(store.state(), ConnectionState::default());
    assert!(connector
        .activate(ActivationRequest::Default)
        .await
        .is_err());
}

#[tokio::test]
async fn url_eager_failure_is_swallowed() {
    let (store, actions) = create_store_and_actions();
    let (url, calls) =
        spawn_rpc_server(|_| Err(json!({"code": -32603, "message": "node down"})));
    let connector = Url::new(actions, url, 5_000);

    connector.connect_eagerly().await.expect("eager never fails");
    assert_eq!(store.state(), ConnectionState::default());
    assert!(!calls.lock().expect("calls").is_empty());
}
