#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use web3_connect_core::{
    ActivationRequest, Actions, Connector, ConnectorKind, Eip1193Provider, EventEmitter,
    EventListener, ProviderRpcError, StateUpdate, Web3Error,
};

pub const ZERO: &str = "0x0000000000000000000000000000000000000000";
pub const ONE: &str = "0x0000000000000000000000000000000000000001";

type Handler = dyn Fn(&str, &Value) -> Result<Value, ProviderRpcError> + Send + Sync;

pub struct MockProvider {
    emitter: EventEmitter,
    handler: Box<Handler>,
    calls: Mutex<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_handler(|method, _| {
            Err(ProviderRpcError::new(
                ProviderRpcError::UNSUPPORTED_METHOD,
                format!("unsupported: {method}"),
            ))
        })
    }

    pub fn with_handler<F>(handler: F) -> Self
    where
        F: Fn(&str, &Value) -> Result<Value, ProviderRpcError> + Send + Sync + 'static,
    {
        Self {
            emitter: EventEmitter::default(),
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl Eip1193Provider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderRpcError> {
        self.calls.lock().expect("calls lock").push(method.to_owned());
        (self.handler)(method, &params)
    }

    fn on(&self, listener: EventListener) {
        self.emitter.on(listener);
    }
}

pub struct MockConnector {
    actions: Actions,
    provider: Arc<MockProvider>,
    name: &'static str,
    custom: bool,
}

impl MockConnector {
    pub fn new(actions: Actions) -> Self {
        Self::named(actions, "Mock")
    }

    pub fn named(actions: Actions, name: &'static str) -> Self {
        Self {
            actions,
            provider: Arc::new(MockProvider::new()),
            name,
            custom: false,
        }
    }

    pub fn with_provider(actions: Actions, provider: Arc<MockProvider>) -> Self {
        Self {
            actions,
            provider,
            name: "Mock",
            custom: false,
        }
    }

    /// Hands `provider` out as the connector's custom provider.
    pub fn with_custom_provider(actions: Actions, provider: Arc<MockProvider>) -> Self {
        Self {
            custom: true,
            ..Self::with_provider(actions, provider)
        }
    }

    pub fn update(&self, update: StateUpdate) -> Result<(), Web3Error> {
        self.actions.update(update)
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn actions(&self) -> &Actions {
        &self.actions
    }

    fn kind(&self) -> ConnectorKind {
        ConnectorKind::Custom(self.name)
    }

    fn provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        Some(Arc::clone(&self.provider) as Arc<dyn Eip1193Provider>)
    }

    fn custom_provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        self.custom
            .then(|| Arc::clone(&self.provider) as Arc<dyn Eip1193Provider>)
    }

    async fn activate(&self, _request: ActivationRequest) -> Result<(), Web3Error> {
        let _ = self.actions.start_activation();
        Ok(())
    }
}
