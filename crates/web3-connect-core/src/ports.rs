use std::fmt;
use std::sync::{Arc, Mutex};

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::ConnectorId;

#[derive(Debug, Error)]
pub enum Web3Error {
    #[error("invalid chain id: {0}")]
    InvalidChainId(String),
    #[error("invalid address {address}: {reason}")]
    InvalidAddress {
        address: String,
        reason: &'static str,
    },
    #[error("connector not found: {0}")]
    ConnectorNotFound(ConnectorId),
    #[error("stores not passed for connector {0}")]
    StoresNotPassed(ConnectorId),
    #[error("at least one initialized connector is required")]
    NoConnectors,
    #[error(
        "the connectors passed to Web3ContextProvider must be referentially static; \
         build a new provider every time the connector list changes"
    )]
    ConnectorsNotStatic,
    #[error("use_web3 can only be used within a Web3ContextProvider scope")]
    ContextMissing,
    #[error(transparent)]
    Rpc(#[from] ProviderRpcError),
    #[error("{0} not installed")]
    NoProvider(&'static str),
    #[error("not running inside a Safe App context")]
    NoSafeContext,
    #[error("no accounts returned")]
    NoAccounts,
    #[error("no rpc url configured for chain {0}")]
    UnsupportedChain(u64),
    #[error("operation not supported by connector: {0}")]
    Unsupported(&'static str),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("validation error: {0}")]
    Validation(String),
    #[error("network mismatch: expected chain {expected}, provider reports {actual}")]
    NetworkMismatch { expected: u64, actual: u64 },
}

/// EIP-1193 `ProviderRpcError`.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("provider rpc error {code}: {message}")]
pub struct ProviderRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProviderRpcError {
    pub const USER_REJECTED: i64 = 4001;
    pub const UNAUTHORIZED: i64 = 4100;
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    pub const DISCONNECTED: i64 = 4900;
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    pub const INTERNAL: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }
}

/// Events emitted by an EIP-1193 provider. Chain ids are kept raw (usually a
/// hex quantity) so connectors validate them in one place.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderEvent {
    Connect { chain_id: Value },
    Disconnect(ProviderRpcError),
    ChainChanged(Value),
    AccountsChanged(Vec<String>),
}

pub type EventListener = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;

#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError>;

    fn on(&self, listener: EventListener);

    fn remove_all_listeners(&self) {}

    fn is_connected(&self) -> bool {
        true
    }

    fn is_metamask(&self) -> bool {
        false
    }
}

#[async_trait]
pub trait EnsResolver: Send + Sync {
    /// Reverse-resolves `address`, `Ok(None)` when no verified primary name is set.
    async fn lookup_address(&self, address: Address) -> Result<Option<String>, Web3Error>;
}

/// Listener registry shared by the provider implementations.
#[derive(Clone, Default)]
pub struct EventEmitter {
    listeners: Arc<Mutex<Vec<EventListener>>>,
}

impl EventEmitter {
    pub fn on(&self, listener: EventListener) {
        if let Ok(mut g) = self.listeners.lock() {
            g.push(listener);
        }
    }

    pub fn remove_all_listeners(&self) {
        if let Ok(mut g) = self.listeners.lock() {
            g.clear();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().map(|g| g.len()).unwrap_or_default()
    }

    pub fn emit(&self, event: &ProviderEvent) {
        // snapshot so listeners may register further listeners
        let listeners = match self.listeners.lock() {
            Ok(g) => g.clone(),
            Err(_) => return,
        };
        for listener in listeners {
            listener(event);
        }
    }
}

impl fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}
