mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;

use web3_connect_connectors::{CoinbaseWallet, CoinbaseWalletOptions};
use web3_connect_core::{
    create_store_and_actions, ActivationRequest, ConnectionState, Connector,
};

use common::{MockCoinbaseSdk, MockWallet};

fn options() -> CoinbaseWalletOptions {
    CoinbaseWalletOptions {
        app_name: "test".to_owned(),
        url: "https://mock.url".to_owned(),
    }
}

#[tokio::test]
async fn activate_after_failed_eager_connection() {
    let (store, actions) = create_store_and_actions();
    let wallet = Arc::new(MockWallet::new("0x1", &[]));
    let sdk = MockCoinbaseSdk::new(wallet);
    let connector = CoinbaseWallet::new(actions, sdk, options(), None);
    assert!(connector.provider().is_none());

    connector.connect_eagerly().await.expect("eager is silent");
    assert!(connector.provider().is_some());
    assert_eq!(store.state(), ConnectionState::default());

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
}

#[tokio::test]
async fn provider_is_built_once_with_configured_url() {
    let (_, actions) = create_store_and_actions();
    let wallet = Arc::new(MockWallet::new("0x1", &[common::ACCOUNT]));
    let sdk = MockCoinbaseSdk::new(wallet.clone());
    let connector = CoinbaseWallet::new(actions, sdk, options(), None);

    connector.connect_eagerly().await.expect("eager");
    connector
        .activate(ActivationRequest::Default)
        .await
        .expect("activate");
    assert_eq!(wallet.listener_count(), 1);
    assert_eq!(
        *connector.sdk().urls.lock().expect("lock"),
        vec!["https://mock.url".to_owned()]
    );
}

#[tokio::test]
async fn deactivate_disconnects_the_sdk() {
    let (store, actions) = create_store_and_actions();
    let wallet = Arc::new(MockWallet::new("0x1", &[common::ACCOUNT]));
    let sdk = MockCoinbaseSdk::new(wallet);
    let connector = CoinbaseWallet::new(actions, sdk, options(), None);
    connector
        .activate(ActivationRequest::Default)
        .await
        .expect("activate");
    assert!(store.state().is_active());

    connector.deactivate().await.expect("deactivate");
    assert_eq!(connector.sdk().disconnects.load(Ordering::SeqCst), 1);
    assert_eq!(store.state(), ConnectionState::default());
}
