use std::fmt;
use std::sync::Arc;

use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::ens;
use crate::ports::{Eip1193Provider, EnsResolver, Web3Error};
use crate::validation::{parse_chain_id, validate_account};

/// Typed wrapper around an EIP-1193 provider, pinned to an expected network
/// when one is given.
#[derive(Clone)]
pub struct WalletProvider {
    inner: Arc<dyn Eip1193Provider>,
    network: Option<u64>,
}

impl WalletProvider {
    pub fn new(inner: Arc<dyn Eip1193Provider>, network: Option<u64>) -> Self {
        Self { inner, network }
    }

    pub fn inner(&self) -> &Arc<dyn Eip1193Provider> {
        &self.inner
    }

    pub fn network(&self) -> Option<u64> {
        self.network
    }

    pub async fn request(&self, method: &str, params: Value) -> Result<Value, Web3Error> {
        Ok(self.inner.request(method, params).await?)
    }

    pub async fn chain_id(&self) -> Result<u64, Web3Error> {
        let raw = self.request("eth_chainId", json!([])).await?;
        let actual = parse_chain_id(&raw)?;
        match self.network {
            Some(expected) if expected != actual => {
                Err(Web3Error::NetworkMismatch { expected, actual })
            }
            _ => Ok(actual),
        }
    }

    pub async fn accounts(&self) -> Result<Vec<Address>, Web3Error> {
        let raw = self.request("eth_accounts", json!([])).await?;
        let arr = raw
            .as_array()
            .ok_or_else(|| Web3Error::Validation("eth_accounts: array expected".to_owned()))?;
        arr.iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| Web3Error::Validation("eth_accounts: string expected".to_owned()))
                    .and_then(validate_account)
            })
            .collect()
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, Web3Error> {
        let raw = self
            .request(
                "eth_call",
                json!([{ "to": to.to_string(), "data": data.to_string() }, "latest"]),
            )
            .await?;
        let hex = raw
            .as_str()
            .ok_or_else(|| Web3Error::Validation("eth_call must return hex data".to_owned()))?;
        hex.parse()
            .map_err(|e| Web3Error::Validation(format!("invalid eth_call result: {e}")))
    }
}

#[async_trait]
impl EnsResolver for WalletProvider {
    async fn lookup_address(&self, address: Address) -> Result<Option<String>, Web3Error> {
        ens::reverse_lookup(self, address).await
    }
}

impl fmt::Debug for WalletProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletProvider")
            .field("network", &self.network)
            .finish_non_exhaustive()
    }
}
