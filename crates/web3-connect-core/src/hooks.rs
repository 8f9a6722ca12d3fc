//! Derived views over a single connector's store.

use std::sync::Arc;

use alloy::primitives::Address;
use tokio::sync::watch;

use crate::connector::Connector;
use crate::domain::ConnectionState;
use crate::ens::{EnsLookup, EnsName, EnsNames};
use crate::ports::EnsResolver;
use crate::store::{create_store_and_actions, Actions, Web3Store};
use crate::wallet_provider::WalletProvider;

/// Whether connectors' providers may be wrapped into [`WalletProvider`]s.
/// `Unavailable` suppresses custom providers too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderLibrary {
    #[default]
    Available,
    Unavailable,
}

/// Creates a store, hands its actions to `f` to build the connector, and
/// returns the connector together with hooks bound to the store.
pub fn initialize_connector<T, F>(f: F) -> (Arc<T>, ConnectorHooks, Web3Store)
where
    T: Connector + 'static,
    F: FnOnce(Actions) -> T,
{
    initialize_connector_with(f, ProviderLibrary::Available)
}

pub fn initialize_connector_with<T, F>(
    f: F,
    library: ProviderLibrary,
) -> (Arc<T>, ConnectorHooks, Web3Store)
where
    T: Connector + 'static,
    F: FnOnce(Actions) -> T,
{
    let (store, actions) = create_store_and_actions();
    bind_hooks(Arc::new(f(actions)), store, library)
}

/// Like [`initialize_connector`] for connectors whose construction can fail.
pub fn try_initialize_connector<T, E, F>(f: F) -> Result<(Arc<T>, ConnectorHooks, Web3Store), E>
where
    T: Connector + 'static,
    F: FnOnce(Actions) -> Result<T, E>,
{
    let (store, actions) = create_store_and_actions();
    let connector = Arc::new(f(actions)?);
    Ok(bind_hooks(connector, store, ProviderLibrary::Available))
}

fn bind_hooks<T: Connector + 'static>(
    connector: Arc<T>,
    store: Web3Store,
    library: ProviderLibrary,
) -> (Arc<T>, ConnectorHooks, Web3Store) {
    let hooks = ConnectorHooks {
        connector: Arc::clone(&connector) as Arc<dyn Connector>,
        store: store.clone(),
        library,
        ens_names: EnsLookup::default(),
        ens_name: EnsLookup::default(),
    };
    (connector, hooks, store)
}

#[derive(Clone)]
pub struct ConnectorHooks {
    connector: Arc<dyn Connector>,
    store: Web3Store,
    library: ProviderLibrary,
    ens_names: EnsLookup,
    ens_name: EnsLookup,
}

impl ConnectorHooks {
    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    pub fn store(&self) -> &Web3Store {
        &self.store
    }

    pub fn state(&self) -> ConnectionState {
        self.store.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.store.subscribe()
    }

    pub fn chain_id(&self) -> Option<u64> {
        self.store.state().chain_id
    }

    pub fn accounts(&self) -> Option<Vec<Address>> {
        self.store.state().accounts
    }

    pub fn is_activating(&self) -> bool {
        self.store.state().activating
    }

    pub fn account(&self) -> Option<Address> {
        self.store.state().account()
    }

    pub fn is_active(&self) -> bool {
        self.store.state().is_active()
    }

    /// The connector's provider while it is active. `network` pins the
    /// wrapper to an expected chain; `enabled = false` always yields `None`.
    pub fn provider(&self, network: Option<u64>, enabled: bool) -> Option<WalletProvider> {
        let state = self.store.state();
        if !enabled || !state.is_active() || state.chain_id.is_none() {
            return None;
        }
        if self.library == ProviderLibrary::Unavailable {
            return None;
        }
        match self.connector.custom_provider() {
            Some(custom) => Some(WalletProvider::new(custom, None)),
            None => self
                .connector
                .provider()
                .map(|inner| WalletProvider::new(inner, network)),
        }
    }

    /// Looks up ENS names for the current accounts. Without a resolver, or
    /// when the accounts changed while the lookup ran, names are `Unknown`.
    pub async fn ens_names(&self, resolver: Option<&dyn EnsResolver>) -> EnsNames {
        let accounts = self.accounts().unwrap_or_default();
        let Some(resolver) = resolver else {
            return EnsNames::Unknown(accounts.len());
        };
        self.ens_names.resolve(resolver, accounts).await;
        self.ens_names
            .names(&self.accounts().unwrap_or_default())
    }

    pub async fn ens_name(&self, resolver: Option<&dyn EnsResolver>) -> EnsName {
        let Some(account) = self.account() else {
            return EnsName::Unknown;
        };
        let Some(resolver) = resolver else {
            return EnsName::Unknown;
        };
        self.ens_name.resolve(resolver, vec![account]).await;
        match self.account() {
            Some(current) => self.ens_name.names(&[current]).get(0),
            None => EnsName::Unknown,
        }
    }
}

impl std::fmt::Debug for ConnectorHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorHooks")
            .field("connector", &self.connector.kind())
            .field("store", &self.store)
            .field("library", &self.library)
            .finish()
    }
}
