//! Connection state store and the action triple connectors drive it with.
//!
//! Every mutation bumps a per-store nullifier. A [`CancelActivation`] handle
//! only takes effect while the nullifier still holds the value it captured, so
//! a cancellation that resolves after a newer activation, update or reset is
//! discarded instead of clobbering the settled state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::domain::{ConnectionState, ConnectorId, StateUpdate};
use crate::ports::Web3Error;
use crate::validation::{validate_account, validate_chain_id};

struct StoreInner {
    id: ConnectorId,
    // serializes mutations; the guarded value is the nullifier
    nullifier: Mutex<u64>,
    state: watch::Sender<ConnectionState>,
}

impl StoreInner {
    fn lock_nullifier(&self) -> MutexGuard<'_, u64> {
        self.nullifier.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Read side of a connector's state.
#[derive(Clone)]
pub struct Web3Store {
    inner: Arc<StoreInner>,
}

impl Web3Store {
    pub fn id(&self) -> ConnectorId {
        self.inner.id
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }
}

impl std::fmt::Debug for Web3Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web3Store")
            .field("id", &self.inner.id)
            .field("state", &*self.inner.state.borrow())
            .finish()
    }
}

/// Write side of a connector's state.
#[derive(Clone)]
pub struct Actions {
    inner: Arc<StoreInner>,
}

impl Actions {
    pub fn connector_id(&self) -> ConnectorId {
        self.inner.id
    }

    /// Marks an activation as in flight and clears any previous connection.
    pub fn start_activation(&self) -> CancelActivation {
        let mut nullifier = self.inner.lock_nullifier();
        *nullifier += 1;
        let captured = *nullifier;
        self.inner.state.send_replace(ConnectionState {
            activating: true,
            ..ConnectionState::default()
        });
        tracing::trace!(connector = %self.inner.id, nullifier = captured, "activation started");
        CancelActivation {
            inner: Arc::clone(&self.inner),
            nullifier: captured,
        }
    }

    /// Merges `update` into the stored state. Both fields are validated before
    /// anything is written. The first update that leaves `chain_id` and
    /// `accounts` both set ends a pending activation.
    pub fn update(&self, update: StateUpdate) -> Result<(), Web3Error> {
        if let Some(chain_id) = update.chain_id {
            validate_chain_id(chain_id)?;
        }
        let accounts = update
            .accounts
            .map(|accounts| {
                accounts
                    .iter()
                    .map(|a| validate_account(a))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        let mut nullifier = self.inner.lock_nullifier();
        *nullifier += 1;
        self.inner.state.send_modify(|state| {
            if let Some(chain_id) = update.chain_id {
                state.chain_id = Some(chain_id);
            }
            if let Some(accounts) = accounts {
                state.accounts = Some(accounts);
            }
            if state.activating && state.chain_id.is_some() && state.accounts.is_some() {
                state.activating = false;
            }
        });
        Ok(())
    }

    pub fn reset_state(&self) {
        let mut nullifier = self.inner.lock_nullifier();
        *nullifier += 1;
        self.inner.state.send_replace(ConnectionState::default());
    }
}

impl std::fmt::Debug for Actions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actions").field("id", &self.inner.id).finish()
    }
}

/// Returned by [`Actions::start_activation`].
#[derive(Clone)]
pub struct CancelActivation {
    inner: Arc<StoreInner>,
    nullifier: u64,
}

impl CancelActivation {
    /// Clears `activating` unless the store moved on since the activation
    /// started. Returns whether the cancellation was applied.
    pub fn cancel(&self) -> bool {
        let nullifier = self.inner.lock_nullifier();
        if *nullifier != self.nullifier {
            tracing::trace!(connector = %self.inner.id, "stale activation cancel ignored");
            return false;
        }
        self.inner
            .state
            .send_if_modified(|state| std::mem::replace(&mut state.activating, false));
        true
    }
}

impl std::fmt::Debug for CancelActivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelActivation")
            .field("id", &self.inner.id)
            .field("nullifier", &self.nullifier)
            .finish()
    }
}

pub fn create_store_and_actions() -> (Web3Store, Actions) {
    let (state, _) = watch::channel(ConnectionState::default());
    let inner = Arc::new(StoreInner {
        id: ConnectorId::next(),
        nullifier: Mutex::new(0),
        state,
    });
    (
        Web3Store {
            inner: Arc::clone(&inner),
        },
        Actions { inner },
    )
}
