//! ENS reverse resolution and the per-hook lookup cache.
//!
//! A lookup batch only lands if no newer batch started while it was in
//! flight, and cached names are only reported for the exact account list they
//! were resolved for.

use std::sync::{Arc, Mutex};

use alloy::dyn_abi::{DynSolType, DynSolValue};
use alloy::primitives::{address, keccak256, Address, Bytes, B256};

use crate::ports::{EnsResolver, Web3Error};
use crate::wallet_provider::WalletProvider;

pub const ENS_REGISTRY: Address = address!("00000000000C2E074eC69A0dFb2997BA6C7d2e1e");

pub fn namehash(name: &str) -> B256 {
    let mut node = B256::ZERO;
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(keccak256(label.as_bytes()).as_slice());
        node = keccak256(buf);
    }
    node
}

fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.as_slice()[0..4]);
    out
}

fn encode_node_call(signature: &str, node: B256) -> Bytes {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector(signature));
    data.extend_from_slice(node.as_slice());
    Bytes::from(data)
}

fn decode_address_word(data: &[u8]) -> Option<Address> {
    if data.len() < 32 {
        return None;
    }
    Some(Address::from_slice(&data[12..32]))
}

async fn resolver_of(provider: &WalletProvider, node: B256) -> Result<Option<Address>, Web3Error> {
    let data = provider
        .call(ENS_REGISTRY, encode_node_call("resolver(bytes32)", node))
        .await?;
    Ok(decode_address_word(&data).filter(|a| !a.is_zero()))
}

/// Reads the primary name of `address` and only returns it if the name
/// resolves forward to the same address.
pub async fn reverse_lookup(
    provider: &WalletProvider,
    address: Address,
) -> Result<Option<String>, Web3Error> {
    let reverse_node = namehash(&format!("{}.addr.reverse", alloy::hex::encode(address)));
    let Some(resolver) = resolver_of(provider, reverse_node).await? else {
        return Ok(None);
    };
    let data = provider
        .call(resolver, encode_node_call("name(bytes32)", reverse_node))
        .await?;
    if data.is_empty() {
        return Ok(None);
    }
    let name = match DynSolType::String
        .abi_decode(&data)
        .map_err(|e| Web3Error::Validation(format!("invalid ENS name response: {e}")))?
    {
        DynSolValue::String(name) if !name.is_empty() => name,
        _ => return Ok(None),
    };

    let forward_node = namehash(&name);
    let Some(forward_resolver) = resolver_of(provider, forward_node).await? else {
        return Ok(None);
    };
    let data = provider
        .call(forward_resolver, encode_node_call("addr(bytes32)", forward_node))
        .await?;
    if decode_address_word(&data) != Some(address) {
        return Ok(None);
    }
    Ok(Some(name))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsNames {
    /// Names are not known yet (no resolver, or a lookup in flight); one slot
    /// per account.
    Unknown(usize),
    /// One entry per account; `None` when no name is set or the lookup failed.
    Resolved(Vec<Option<String>>),
}

impl EnsNames {
    pub fn len(&self) -> usize {
        match self {
            EnsNames::Unknown(len) => *len,
            EnsNames::Resolved(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> EnsName {
        match self {
            EnsNames::Unknown(_) => EnsName::Unknown,
            EnsNames::Resolved(names) => match names.get(index) {
                Some(Some(name)) => EnsName::Name(name.clone()),
                Some(None) => EnsName::NotSet,
                None => EnsName::Unknown,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnsName {
    Unknown,
    NotSet,
    Name(String),
}

impl EnsName {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            EnsName::Name(name) => Some(name),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct EnsLookupState {
    generation: u64,
    accounts: Vec<Address>,
    names: Option<Vec<Option<String>>>,
}

#[derive(Debug, Clone, Default)]
pub struct EnsLookup {
    state: Arc<Mutex<EnsLookupState>>,
}

impl EnsLookup {
    /// Names cached for exactly `accounts`, or `Unknown`.
    pub fn names(&self, accounts: &[Address]) -> EnsNames {
        let Ok(g) = self.state.lock() else {
            return EnsNames::Unknown(accounts.len());
        };
        match &g.names {
            Some(names) if g.accounts == accounts => EnsNames::Resolved(names.clone()),
            _ => EnsNames::Unknown(accounts.len()),
        }
    }

    pub async fn resolve(&self, resolver: &dyn EnsResolver, accounts: Vec<Address>) -> EnsNames {
        if accounts.is_empty() {
            return EnsNames::Unknown(0);
        }
        let generation = {
            let Ok(mut g) = self.state.lock() else {
                return EnsNames::Unknown(accounts.len());
            };
            g.generation += 1;
            if g.accounts != accounts {
                g.accounts = accounts.clone();
                g.names = None;
            }
            g.generation
        };

        let lookups = accounts.iter().map(|a| resolver.lookup_address(*a));
        let results = futures::future::join_all(lookups).await;
        let names = match results.into_iter().collect::<Result<Vec<_>, _>>() {
            Ok(names) => names,
            Err(e) => {
                tracing::debug!(error = %e, "could not fetch ENS names");
                vec![None; accounts.len()]
            }
        };

        let Ok(mut g) = self.state.lock() else {
            return EnsNames::Unknown(accounts.len());
        };
        if g.generation != generation {
            tracing::trace!("discarding stale ENS lookup");
            return match &g.names {
                Some(current) if g.accounts == accounts => EnsNames::Resolved(current.clone()),
                _ => EnsNames::Unknown(accounts.len()),
            };
        }
        g.names = Some(names.clone());
        EnsNames::Resolved(names)
    }
}
