use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

static NEXT_CONNECTOR_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a connector, shared with the store it owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectorId(u64);

impl ConnectorId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTOR_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionState {
    pub chain_id: Option<u64>,
    pub accounts: Option<Vec<Address>>,
    pub activating: bool,
}

impl ConnectionState {
    pub fn is_active(&self) -> bool {
        self.chain_id.is_some() && self.accounts.is_some() && !self.activating
    }

    pub fn account(&self) -> Option<Address> {
        self.accounts.as_ref().and_then(|a| a.first().copied())
    }
}

/// A partial state report from a wallet. Fields left as `None` keep their
/// stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    pub chain_id: Option<u64>,
    pub accounts: Option<Vec<String>>,
}

impl StateUpdate {
    pub fn chain(chain_id: u64) -> Self {
        Self {
            chain_id: Some(chain_id),
            accounts: None,
        }
    }

    pub fn accounts<I, S>(accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chain_id: None,
            accounts: Some(accounts.into_iter().map(Into::into).collect()),
        }
    }

    pub fn connected<I, S>(chain_id: u64, accounts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chain_id: Some(chain_id),
            ..Self::accounts(accounts)
        }
    }
}
