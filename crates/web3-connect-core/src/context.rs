//! Scoped access to the priority connector's state for a UI subtree.

use std::cell::RefCell;
use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::watch;

use crate::connector::Connector;
use crate::domain::{ConnectionState, ConnectorId};
use crate::ens::{EnsName, EnsNames};
use crate::ports::{EnsResolver, Web3Error};
use crate::selection::{InitializedConnector, PriorityConnector};
use crate::wallet_provider::WalletProvider;

thread_local! {
    static CONTEXT_STACK: RefCell<Vec<Web3ContextValue>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone)]
pub struct Web3ContextValue {
    pub connector: Arc<dyn Connector>,
    pub chain_id: Option<u64>,
    pub accounts: Option<Vec<Address>>,
    pub is_activating: bool,
    pub account: Option<Address>,
    pub is_active: bool,
    pub provider: Option<WalletProvider>,
    pub ens_names: EnsNames,
    pub ens_name: EnsName,
    pub hooks: PriorityConnector,
}

impl std::fmt::Debug for Web3ContextValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3ContextValue")
            .field("connector", &self.connector.kind())
            .field("chain_id", &self.chain_id)
            .field("accounts", &self.accounts)
            .field("is_activating", &self.is_activating)
            .field("is_active", &self.is_active)
            .field("ens_names", &self.ens_names)
            .finish_non_exhaustive()
    }
}

/// Computes the context value from a fixed list of connectors.
///
/// The list must stay the same (same connectors, same order) for the lifetime
/// of the provider; pass the current list to [`Web3ContextProvider::render`]
/// on every pass and build a new provider when it changes.
#[derive(Clone)]
pub struct Web3ContextProvider {
    connector_ids: Vec<ConnectorId>,
    hooks: PriorityConnector,
    connector_override: Option<Arc<dyn Connector>>,
    network: Option<u64>,
    lookup_ens: bool,
}

impl Web3ContextProvider {
    pub fn new(connectors: Vec<InitializedConnector>) -> Result<Self, Web3Error> {
        let connector_ids = connectors.iter().map(InitializedConnector::id).collect();
        Ok(Self {
            connector_ids,
            hooks: PriorityConnector::new(connectors)?,
            connector_override: None,
            network: None,
            lookup_ens: true,
        })
    }

    /// Reflects `connector` instead of the priority selection.
    pub fn with_connector_override(mut self, connector: Option<Arc<dyn Connector>>) -> Self {
        self.connector_override = connector;
        self
    }

    pub fn with_network(mut self, network: Option<u64>) -> Self {
        self.network = network;
        self
    }

    pub fn with_lookup_ens(mut self, lookup_ens: bool) -> Self {
        self.lookup_ens = lookup_ens;
        self
    }

    pub fn hooks(&self) -> &PriorityConnector {
        &self.hooks
    }

    pub fn ensure_static(&self, connectors: &[InitializedConnector]) -> Result<(), Web3Error> {
        let unchanged = connectors.len() == self.connector_ids.len()
            && connectors
                .iter()
                .zip(&self.connector_ids)
                .all(|(c, id)| c.id() == *id);
        if unchanged {
            Ok(())
        } else {
            Err(Web3Error::ConnectorsNotStatic)
        }
    }

    pub async fn render(
        &self,
        connectors: &[InitializedConnector],
    ) -> Result<Web3ContextValue, Web3Error> {
        self.ensure_static(connectors)?;

        let selected = self.hooks.selected();
        let priority = self.hooks.priority_connector();
        let connector = self.connector_override.clone().unwrap_or(priority);
        let target = &*connector;

        let chain_id = selected.selected_chain_id(target)?;
        let accounts = selected.selected_accounts(target)?;
        let is_activating = selected.selected_is_activating(target)?;
        let account = selected.selected_account(target)?;
        let is_active = selected.selected_is_active(target)?;
        let provider = selected.selected_provider(target, self.network)?;

        let resolver = provider
            .as_ref()
            .filter(|_| self.lookup_ens)
            .map(|p| p as &dyn EnsResolver);
        let ens_names = selected.selected_ens_names(target, resolver).await?;
        let ens_name = selected.selected_ens_name(target, resolver).await?;

        Ok(Web3ContextValue {
            connector: Arc::clone(&connector),
            chain_id,
            accounts,
            is_activating,
            account,
            is_active,
            provider,
            ens_names,
            ens_name,
            hooks: self.hooks.clone(),
        })
    }

    /// A stream of context values that re-renders after any store in
    /// `connectors` changes. Renders run one at a time, so a value never
    /// replaces one computed from newer state.
    pub fn updates(
        &self,
        connectors: Vec<InitializedConnector>,
    ) -> Result<ContextUpdates, Web3Error> {
        self.ensure_static(&connectors)?;
        let receivers = connectors.iter().map(|c| c.hooks.subscribe()).collect();
        Ok(ContextUpdates {
            provider: self.clone(),
            connectors,
            receivers,
            rendered: false,
        })
    }

    /// Makes `value` visible to [`use_web3`] for the duration of `f`.
    pub fn scope<R>(value: Web3ContextValue, f: impl FnOnce() -> R) -> R {
        struct PopOnDrop;
        impl Drop for PopOnDrop {
            fn drop(&mut self) {
                CONTEXT_STACK.with(|stack| {
                    stack.borrow_mut().pop();
                });
            }
        }

        CONTEXT_STACK.with(|stack| stack.borrow_mut().push(value));
        let _guard = PopOnDrop;
        f()
    }
}

pub struct ContextUpdates {
    provider: Web3ContextProvider,
    connectors: Vec<InitializedConnector>,
    receivers: Vec<watch::Receiver<ConnectionState>>,
    rendered: bool,
}

impl ContextUpdates {
    /// Renders immediately the first time, then waits for a store change.
    /// Changes that land while a render is in flight coalesce into one
    /// follow-up render. `None` once the stores are gone.
    pub async fn next(&mut self) -> Option<Result<Web3ContextValue, Web3Error>> {
        if self.rendered {
            let changes = self.receivers.iter_mut().map(|rx| Box::pin(rx.changed()));
            let (changed, _, _) = futures::future::select_all(changes).await;
            changed.ok()?;
        }
        self.rendered = true;
        for rx in &mut self.receivers {
            rx.borrow_and_update();
        }
        Some(self.provider.render(&self.connectors).await)
    }
}

/// The innermost context installed by [`Web3ContextProvider::scope`].
pub fn use_web3() -> Result<Web3ContextValue, Web3Error> {
    CONTEXT_STACK.with(|stack| stack.borrow().last().cloned().ok_or(Web3Error::ContextMissing))
}
