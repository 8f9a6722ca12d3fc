#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Read;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use async_trait::async_trait;
use serde_json::{json, Value};
use tiny_http::{Response, Server};

use web3_connect_core::{
    Eip1193Provider, EventEmitter, EventListener, ProviderEvent, ProviderRpcError,
};
use web3_connect_connectors::{CoinbaseWalletSdk, WalletConnectClient};

pub const ACCOUNT: &str = "0x1000000000000000000000000000000000000001";
pub const OTHER_ACCOUNT: &str = "0x2000000000000000000000000000000000000002";

/// In-memory wallet answering the EIP-1193 methods the connectors use.
#[derive(Default)]
pub struct MockWallet {
    pub chain_id: Mutex<String>,
    pub accounts: Mutex<Vec<String>>,
    /// Chains `wallet_switchEthereumChain` accepts without 4902.
    pub known_chains: Mutex<HashSet<u64>>,
    pub request_accounts_error: Mutex<Option<ProviderRpcError>>,
    pub watch_asset_result: Mutex<Option<Value>>,
    pub connected: AtomicBool,
    calls: Mutex<Vec<String>>,
    emitter: EventEmitter,
}

impl MockWallet {
    pub fn new(chain_id: &str, accounts: &[&str]) -> Self {
        let wallet = Self::default();
        *wallet.chain_id.lock().expect("chain lock") = chain_id.to_owned();
        *wallet.accounts.lock().expect("accounts lock") =
            accounts.iter().map(|a| (*a).to_owned()).collect();
        wallet.known_chains.lock().expect("chains lock").insert(1);
        wallet
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn emit(&self, event: ProviderEvent) {
        self.emitter.emit(&event);
    }

    pub fn listener_count(&self) -> usize {
        self.emitter.listener_count()
    }

    fn handle(&self, method: &str, params: &Value) -> Result<Value, ProviderRpcError> {
        match method {
            "eth_chainId" => Ok(json!(*self.chain_id.lock().expect("chain lock"))),
            "eth_accounts" => Ok(json!(*self.accounts.lock().expect("accounts lock"))),
            "eth_requestAccounts" => {
                if let Some(err) = self.request_accounts_error.lock().expect("error lock").clone() {
                    return Err(err);
                }
                Ok(json!(*self.accounts.lock().expect("accounts lock")))
            }
            "wallet_switchEthereumChain" => {
                let hex = params[0]["chainId"].as_str().unwrap_or_default().to_owned();
                let id = u64::from_str_radix(hex.trim_start_matches("0x"), 16).unwrap_or_default();
                if !self.known_chains.lock().expect("chains lock").contains(&id) {
                    return Err(ProviderRpcError::new(
                        ProviderRpcError::UNRECOGNIZED_CHAIN,
                        "unrecognized chain",
                    ));
                }
                *self.chain_id.lock().expect("chain lock") = hex;
                Ok(Value::Null)
            }
            "wallet_addEthereumChain" => {
                let hex = params[0]["chainId"].as_str().unwrap_or_default();
                let id = u64::from_str_radix(hex.trim_start_matches("0x"), 16).unwrap_or_default();
                self.known_chains.lock().expect("chains lock").insert(id);
                Ok(Value::Null)
            }
            "wallet_watchAsset" => Ok(self
                .watch_asset_result
                .lock()
                .expect("watch lock")
                .clone()
                .unwrap_or(json!(true))),
            other => Err(ProviderRpcError::new(
                ProviderRpcError::UNSUPPORTED_METHOD,
                format!("unsupported: {other}"),
            )),
        }
    }
}

#[async_trait]
impl Eip1193Provider for MockWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.calls.lock().expect("calls lock").push(method.to_owned());
        self.handle(method, &params)
    }

    fn on(&self, listener: EventListener) {
        self.emitter.on(listener);
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

/// Shares one [`MockWallet`] between a connector and the test.
#[derive(Clone)]
pub struct SharedWallet(pub Arc<MockWallet>);

#[async_trait]
impl Eip1193Provider for SharedWallet {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.0.request(method, params).await
    }

    fn on(&self, listener: EventListener) {
        self.0.on(listener);
    }
}

pub struct MockWalletConnect {
    pub wallet: MockWallet,
    pub session: AtomicBool,
    pub disconnects: AtomicUsize,
}

impl MockWalletConnect {
    pub fn new(chain_id: &str, accounts: &[&str]) -> Self {
        Self {
            wallet: MockWallet::new(chain_id, accounts),
            session: AtomicBool::new(false),
            disconnects: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Eip1193Provider for MockWalletConnect {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.wallet.request(method, params).await
    }

    fn on(&self, listener: EventListener) {
        self.wallet.on(listener);
    }
}

#[async_trait]
impl WalletConnectClient for MockWalletConnect {
    fn connected(&self) -> bool {
        self.session.load(Ordering::SeqCst)
    }

    async fn enable(&self) -> Result<Vec<String>, ProviderRpcError> {
        self.session.store(true, Ordering::SeqCst);
        Ok(self.wallet.accounts.lock().expect("accounts lock").clone())
    }

    async fn disconnect(&self) -> Result<(), ProviderRpcError> {
        self.session.store(false, Ordering::SeqCst);
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub struct MockCoinbaseSdk {
    pub wallet: Arc<MockWallet>,
    pub urls: Mutex<Vec<String>>,
    pub disconnects: AtomicUsize,
}

impl MockCoinbaseSdk {
    pub fn new(wallet: Arc<MockWallet>) -> Self {
        Self {
            wallet,
            urls: Mutex::new(Vec::new()),
            disconnects: AtomicUsize::new(0),
        }
    }
}

impl CoinbaseWalletSdk for MockCoinbaseSdk {
    type Provider = SharedWallet;

    fn make_web3_provider(&self, url: &str) -> SharedWallet {
        self.urls.lock().expect("urls lock").push(url.to_owned());
        SharedWallet(Arc::clone(&self.wallet))
    }

    fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}

/// JSON-RPC node on a random local port. `handler` maps a method to its
/// result, or to an `error` object when it returns `Err`.
pub fn spawn_rpc_server<F>(handler: F) -> (String, Arc<Mutex<Vec<String>>>)
where
    F: Fn(&str) -> Result<Value, Value> + Send + 'static,
{
    let server = Server::http("127.0.0.1:0").expect("start server");
    let url = format!("http://{}", server.server_addr());
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&calls);

    thread::spawn(move || {
        for mut req in server.incoming_requests() {
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let payload: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let method = payload["method"].as_str().unwrap_or_default().to_owned();
            if let Ok(mut g) = seen.lock() {
                g.push(method.clone());
            }
            let reply = match handler(&method) {
                Ok(result) => json!({"jsonrpc": "2.0", "id": payload["id"], "result": result}),
                Err(error) => json!({"jsonrpc": "2.0", "id": payload["id"], "error": error}),
            };
            let _ = req.respond(Response::from_string(reply.to_string()));
        }
    });

    (url, calls)
}
