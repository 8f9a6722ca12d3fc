use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use web3_connect_core::{Eip1193Provider, EventEmitter, EventListener, ProviderRpcError, Web3Error};

/// EIP-1193 provider over HTTP JSON-RPC. Endpoints are tried in order; the
/// next one is used only when the previous could not be reached.
#[derive(Debug)]
pub struct JsonRpcProvider {
    urls: Vec<String>,
    client: reqwest::Client,
    emitter: EventEmitter,
    next_id: AtomicU64,
}

impl JsonRpcProvider {
    pub fn new(urls: Vec<String>, timeout_ms: u64) -> Result<Self, Web3Error> {
        if urls.is_empty() {
            return Err(Web3Error::Validation("at least one rpc url is required".to_owned()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|e| Web3Error::Transport(format!("failed to build rpc client: {e}")))?;
        Ok(Self {
            urls,
            client,
            emitter: EventEmitter::default(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    async fn call(&self, url: &str, payload: &Value) -> Result<Value, CallError> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(|e| CallError::Unreachable(format!("rpc request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| CallError::Unreachable(format!("rpc json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            let rpc: ProviderRpcError = serde_json::from_value(err.clone()).unwrap_or_else(|_| {
                ProviderRpcError::internal(format!("rpc returned error: {err}"))
            });
            return Err(CallError::Rpc(rpc));
        }
        if !status.is_success() {
            return Err(CallError::Unreachable(format!("rpc status {status}: {body}")));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| CallError::Rpc(ProviderRpcError::internal("rpc response missing result")))
    }
}

enum CallError {
    Unreachable(String),
    Rpc(ProviderRpcError),
}

#[async_trait]
impl Eip1193Provider for JsonRpcProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params,
        });
        let mut last = String::new();
        for url in &self.urls {
            match self.call(url, &payload).await {
                Ok(result) => return Ok(result),
                Err(CallError::Rpc(e)) => return Err(e),
                Err(CallError::Unreachable(reason)) => {
                    tracing::debug!(%url, %method, %reason, "rpc endpoint failed, trying next");
                    last = reason;
                }
            }
        }
        Err(ProviderRpcError::new(ProviderRpcError::DISCONNECTED, last))
    }

    fn on(&self, listener: EventListener) {
        self.emitter.on(listener);
    }

    fn remove_all_listeners(&self) {
        self.emitter.remove_all_listeners();
    }
}
