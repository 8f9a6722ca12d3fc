//! Hook sets spanning several initialized connectors.
//!
//! Every query evaluates the corresponding hook of each connector in input
//! order before picking the requested one, so a caller that re-runs its
//! queries on every pass always touches every store the same way.

use std::sync::Arc;

use alloy::primitives::Address;

use crate::connector::Connector;
use crate::domain::ConnectorId;
use crate::ens::{EnsName, EnsNames};
use crate::hooks::ConnectorHooks;
use crate::ports::{EnsResolver, Web3Error};
use crate::store::Web3Store;
use crate::wallet_provider::WalletProvider;

/// A connector as returned by `initialize_connector`, optionally with its
/// store.
#[derive(Clone)]
pub struct InitializedConnector {
    pub connector: Arc<dyn Connector>,
    pub hooks: ConnectorHooks,
    pub store: Option<Web3Store>,
}

impl InitializedConnector {
    pub fn new(connector: Arc<dyn Connector>, hooks: ConnectorHooks) -> Self {
        Self {
            connector,
            hooks,
            store: None,
        }
    }

    pub fn with_store(
        connector: Arc<dyn Connector>,
        hooks: ConnectorHooks,
        store: Web3Store,
    ) -> Self {
        Self {
            connector,
            hooks,
            store: Some(store),
        }
    }

    pub fn id(&self) -> ConnectorId {
        self.connector.id()
    }
}

impl<T: Connector + 'static> From<(Arc<T>, ConnectorHooks, Web3Store)> for InitializedConnector {
    fn from((connector, hooks, store): (Arc<T>, ConnectorHooks, Web3Store)) -> Self {
        Self::with_store(connector, hooks, store)
    }
}

impl<T: Connector + 'static> From<(Arc<T>, ConnectorHooks)> for InitializedConnector {
    fn from((connector, hooks): (Arc<T>, ConnectorHooks)) -> Self {
        Self::new(connector, hooks)
    }
}

#[derive(Clone)]
pub struct SelectedConnector {
    connectors: Vec<InitializedConnector>,
}

impl SelectedConnector {
    pub fn new(connectors: Vec<InitializedConnector>) -> Result<Self, Web3Error> {
        if connectors.is_empty() {
            return Err(Web3Error::NoConnectors);
        }
        Ok(Self { connectors })
    }

    pub fn connectors(&self) -> &[InitializedConnector] {
        &self.connectors
    }

    fn index_of(&self, connector: &dyn Connector) -> Result<usize, Web3Error> {
        let id = connector.id();
        self.connectors
            .iter()
            .position(|c| c.id() == id)
            .ok_or(Web3Error::ConnectorNotFound(id))
    }

    fn select<T>(
        &self,
        connector: &dyn Connector,
        f: impl Fn(&ConnectorHooks) -> T,
    ) -> Result<T, Web3Error> {
        let index = self.index_of(connector)?;
        let mut values: Vec<T> = self.connectors.iter().map(|c| f(&c.hooks)).collect();
        Ok(values.swap_remove(index))
    }

    pub fn selected_store(&self, connector: &dyn Connector) -> Result<Web3Store, Web3Error> {
        let index = self.index_of(connector)?;
        self.connectors[index]
            .store
            .clone()
            .ok_or(Web3Error::StoresNotPassed(connector.id()))
    }

    pub fn selected_chain_id(&self, connector: &dyn Connector) -> Result<Option<u64>, Web3Error> {
        self.select(connector, ConnectorHooks::chain_id)
    }

    pub fn selected_accounts(
        &self,
        connector: &dyn Connector,
    ) -> Result<Option<Vec<Address>>, Web3Error> {
        self.select(connector, ConnectorHooks::accounts)
    }

    pub fn selected_is_activating(&self, connector: &dyn Connector) -> Result<bool, Web3Error> {
        self.select(connector, ConnectorHooks::is_activating)
    }

    pub fn selected_account(
        &self,
        connector: &dyn Connector,
    ) -> Result<Option<Address>, Web3Error> {
        self.select(connector, ConnectorHooks::account)
    }

    pub fn selected_is_active(&self, connector: &dyn Connector) -> Result<bool, Web3Error> {
        self.select(connector, ConnectorHooks::is_active)
    }

    /// Only the selected connector's provider is enabled.
    pub fn selected_provider(
        &self,
        connector: &dyn Connector,
        network: Option<u64>,
    ) -> Result<Option<WalletProvider>, Web3Error> {
        let index = self.index_of(connector)?;
        let mut values: Vec<_> = self
            .connectors
            .iter()
            .enumerate()
            .map(|(i, c)| c.hooks.provider(network, i == index))
            .collect();
        Ok(values.swap_remove(index))
    }

    pub async fn selected_ens_names(
        &self,
        connector: &dyn Connector,
        resolver: Option<&dyn EnsResolver>,
    ) -> Result<EnsNames, Web3Error> {
        let index = self.index_of(connector)?;
        let mut values = Vec::with_capacity(self.connectors.len());
        for (i, c) in self.connectors.iter().enumerate() {
            let resolver = if i == index { resolver } else { None };
            values.push(c.hooks.ens_names(resolver).await);
        }
        Ok(values.swap_remove(index))
    }

    pub async fn selected_ens_name(
        &self,
        connector: &dyn Connector,
        resolver: Option<&dyn EnsResolver>,
    ) -> Result<EnsName, Web3Error> {
        let index = self.index_of(connector)?;
        let mut values = Vec::with_capacity(self.connectors.len());
        for (i, c) in self.connectors.iter().enumerate() {
            let resolver = if i == index { resolver } else { None };
            values.push(c.hooks.ens_name(resolver).await);
        }
        Ok(values.swap_remove(index))
    }
}

/// Selected hooks applied to whichever connector currently has priority: the
/// first active one in input order, or the first one if none is active.
#[derive(Clone)]
pub struct PriorityConnector {
    selected: SelectedConnector,
}

impl PriorityConnector {
    pub fn new(connectors: Vec<InitializedConnector>) -> Result<Self, Web3Error> {
        Ok(Self {
            selected: SelectedConnector::new(connectors)?,
        })
    }

    pub fn selected(&self) -> &SelectedConnector {
        &self.selected
    }

    pub fn priority_connector(&self) -> Arc<dyn Connector> {
        let connectors = self.selected.connectors();
        let active: Vec<bool> = connectors.iter().map(|c| c.hooks.is_active()).collect();
        let index = active.iter().position(|&a| a).unwrap_or(0);
        Arc::clone(&connectors[index].connector)
    }

    pub fn priority_store(&self) -> Result<Web3Store, Web3Error> {
        self.selected.selected_store(&*self.priority_connector())
    }

    pub fn priority_chain_id(&self) -> Result<Option<u64>, Web3Error> {
        self.selected.selected_chain_id(&*self.priority_connector())
    }

    pub fn priority_accounts(&self) -> Result<Option<Vec<Address>>, Web3Error> {
        self.selected.selected_accounts(&*self.priority_connector())
    }

    pub fn priority_is_activating(&self) -> Result<bool, Web3Error> {
        self.selected
            .selected_is_activating(&*self.priority_connector())
    }

    pub fn priority_account(&self) -> Result<Option<Address>, Web3Error> {
        self.selected.selected_account(&*self.priority_connector())
    }

    pub fn priority_is_active(&self) -> Result<bool, Web3Error> {
        self.selected.selected_is_active(&*self.priority_connector())
    }

    pub fn priority_provider(
        &self,
        network: Option<u64>,
    ) -> Result<Option<WalletProvider>, Web3Error> {
        self.selected
            .selected_provider(&*self.priority_connector(), network)
    }

    pub async fn priority_ens_names(
        &self,
        resolver: Option<&dyn EnsResolver>,
    ) -> Result<EnsNames, Web3Error> {
        let connector = self.priority_connector();
        self.selected.selected_ens_names(&*connector, resolver).await
    }

    pub async fn priority_ens_name(
        &self,
        resolver: Option<&dyn EnsResolver>,
    ) -> Result<EnsName, Web3Error> {
        let connector = self.priority_connector();
        self.selected.selected_ens_name(&*connector, resolver).await
    }
}
