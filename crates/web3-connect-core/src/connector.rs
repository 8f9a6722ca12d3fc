use std::fmt;
use std::sync::Arc;

use alloy::primitives::Address;
use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Value};

use crate::domain::ConnectorId;
use crate::ports::{Eip1193Provider, Web3Error};
use crate::store::Actions;
use crate::validation::to_hex_chain_id;

/// Callback for errors a connector surfaces outside of a caller's request,
/// e.g. a provider `disconnect` event.
pub type ErrorHandler = Arc<dyn Fn(&Web3Error) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorKind {
    Injected,
    Eip1193,
    WalletConnect,
    CoinbaseWallet,
    Network,
    Url,
    GnosisSafe,
    Empty,
    Custom(&'static str),
}

impl ConnectorKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ConnectorKind::Injected => "MetaMask",
            ConnectorKind::Eip1193 => "EIP-1193",
            ConnectorKind::WalletConnect => "WalletConnect",
            ConnectorKind::CoinbaseWallet => "Coinbase Wallet",
            ConnectorKind::Network => "Network",
            ConnectorKind::Url => "Url",
            ConnectorKind::GnosisSafe => "Gnosis Safe",
            ConnectorKind::Empty => "Empty",
            ConnectorKind::Custom(name) => *name,
        }
    }
}

impl fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a connector can do, so UI code never has to inspect concrete types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectorCapabilities {
    /// `activate` can move an existing connection to another chain.
    pub supports_chain_switch: bool,
    /// `activate` understands [`ActivationRequest::AddChain`] and can add
    /// unknown chains to the wallet.
    pub accepts_chain_parameters: bool,
    /// `deactivate` tears down a wallet session rather than only resetting
    /// local state.
    pub requires_explicit_disconnect: bool,
    pub supports_watch_asset: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// EIP-3085 `wallet_addEthereumChain` parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddEthereumChainParameter {
    #[serde(serialize_with = "serialize_hex_chain_id")]
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_explorer_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_urls: Option<Vec<String>>,
}

impl AddEthereumChainParameter {
    pub fn to_rpc_value(&self) -> Value {
        json!(self)
    }
}

/// EIP-747 `wallet_watchAsset` parameters for an ERC-20 token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchAssetParameters {
    #[serde(serialize_with = "serialize_checksummed")]
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl WatchAssetParameters {
    pub fn to_rpc_value(&self) -> Value {
        json!({ "type": "ERC20", "options": self })
    }
}

fn serialize_hex_chain_id<S: Serializer>(
    chain_id: &u64,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_hex_chain_id(*chain_id))
}

fn serialize_checksummed<S: Serializer>(
    address: &Address,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(address)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ActivationRequest {
    /// Connect on whatever chain the wallet is currently on.
    #[default]
    Default,
    Chain(u64),
    /// Connect on a chain, adding it to the wallet first if it is unknown.
    AddChain(AddEthereumChainParameter),
}

impl ActivationRequest {
    pub fn desired_chain_id(&self) -> Option<u64> {
        match self {
            ActivationRequest::Default => None,
            ActivationRequest::Chain(chain_id) => Some(*chain_id),
            ActivationRequest::AddChain(params) => Some(params.chain_id),
        }
    }
}

impl From<u64> for ActivationRequest {
    fn from(chain_id: u64) -> Self {
        ActivationRequest::Chain(chain_id)
    }
}

impl From<Option<u64>> for ActivationRequest {
    fn from(chain_id: Option<u64>) -> Self {
        chain_id.map_or(ActivationRequest::Default, ActivationRequest::Chain)
    }
}

impl From<AddEthereumChainParameter> for ActivationRequest {
    fn from(params: AddEthereumChainParameter) -> Self {
        ActivationRequest::AddChain(params)
    }
}

#[async_trait]
pub trait Connector: Send + Sync {
    fn actions(&self) -> &Actions;

    fn kind(&self) -> ConnectorKind;

    fn capabilities(&self) -> ConnectorCapabilities {
        ConnectorCapabilities::default()
    }

    fn id(&self) -> ConnectorId {
        self.actions().connector_id()
    }

    /// The EIP-1193 provider backing this connector, once it exists.
    fn provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        None
    }

    /// A provider handed out as is, without wrapping. Read-only connectors
    /// expose their JSON-RPC transport here.
    fn custom_provider(&self) -> Option<Arc<dyn Eip1193Provider>> {
        None
    }

    /// Initiates a connection.
    async fn activate(&self, request: ActivationRequest) -> Result<(), Web3Error>;

    /// Reconnects without prompting the user, if the wallet allows it.
    async fn connect_eagerly(&self) -> Result<(), Web3Error> {
        Ok(())
    }

    /// Disconnects. Connectors without a session to tear down just reset.
    async fn deactivate(&self) -> Result<(), Web3Error> {
        self.reset_state();
        Ok(())
    }

    fn reset_state(&self) {
        self.actions().reset_state();
    }

    async fn watch_asset(&self, _asset: WatchAssetParameters) -> Result<bool, Web3Error> {
        Err(Web3Error::Unsupported("wallet_watchAsset"))
    }
}
