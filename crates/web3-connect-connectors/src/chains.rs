//! Well-known chains and their public RPC endpoints.

use std::collections::BTreeMap;

use web3_connect_core::{ActivationRequest, AddEthereumChainParameter, NativeCurrency};

use crate::config::ConnectorConfig;

#[derive(Debug, Clone, Copy)]
pub struct Currency {
    pub name: &'static str,
    pub symbol: &'static str,
    pub decimals: u8,
}

const ETH: Currency = Currency {
    name: "Ether",
    symbol: "ETH",
    decimals: 18,
};

const MATIC: Currency = Currency {
    name: "Matic",
    symbol: "MATIC",
    decimals: 18,
};

#[derive(Debug, Clone, Copy)]
pub struct ChainInformation {
    pub chain_id: u64,
    pub name: &'static str,
    pub urls: &'static [&'static str],
    /// Set for chains a wallet may not know yet; enough to add them.
    pub native_currency: Option<Currency>,
    pub block_explorer_urls: &'static [&'static str],
}

pub const CHAINS: &[ChainInformation] = &[
    ChainInformation {
        chain_id: 1,
        name: "Mainnet",
        urls: &["https://cloudflare-eth.com", "https://ethereum-rpc.publicnode.com"],
        native_currency: None,
        block_explorer_urls: &[],
    },
    ChainInformation {
        chain_id: 11_155_111,
        name: "Sepolia",
        urls: &["https://ethereum-sepolia-rpc.publicnode.com"],
        native_currency: None,
        block_explorer_urls: &[],
    },
    ChainInformation {
        chain_id: 10,
        name: "Optimism",
        urls: &["https://mainnet.optimism.io"],
        native_currency: Some(ETH),
        block_explorer_urls: &["https://optimistic.etherscan.io"],
    },
    ChainInformation {
        chain_id: 42_161,
        name: "Arbitrum One",
        urls: &["https://arb1.arbitrum.io/rpc"],
        native_currency: Some(ETH),
        block_explorer_urls: &["https://arbiscan.io"],
    },
    ChainInformation {
        chain_id: 8_453,
        name: "Base",
        urls: &["https://mainnet.base.org"],
        native_currency: Some(ETH),
        block_explorer_urls: &["https://basescan.org"],
    },
    ChainInformation {
        chain_id: 137,
        name: "Polygon Mainnet",
        urls: &["https://polygon-rpc.com"],
        native_currency: Some(MATIC),
        block_explorer_urls: &["https://polygonscan.com"],
    },
];

pub fn chain(chain_id: u64) -> Option<&'static ChainInformation> {
    CHAINS.iter().find(|c| c.chain_id == chain_id)
}

/// Public endpoints per chain, with chains from `config` taking precedence.
pub fn urls(config: &ConnectorConfig) -> BTreeMap<u64, Vec<String>> {
    let mut map: BTreeMap<u64, Vec<String>> = CHAINS
        .iter()
        .filter(|c| !c.urls.is_empty())
        .map(|c| (c.chain_id, c.urls.iter().map(|u| (*u).to_owned()).collect()))
        .collect();
    for (chain_id, urls) in &config.rpc_urls {
        map.insert(*chain_id, urls.clone());
    }
    map
}

/// What to pass to `activate` to end up on `chain_id`: full chain
/// parameters when known, so wallets can add the chain, else the bare id.
pub fn add_chain_parameters(chain_id: u64) -> ActivationRequest {
    let Some(info) = chain(chain_id) else {
        return ActivationRequest::Chain(chain_id);
    };
    let Some(currency) = info.native_currency else {
        return ActivationRequest::Chain(chain_id);
    };
    ActivationRequest::AddChain(AddEthereumChainParameter {
        chain_id,
        chain_name: info.name.to_owned(),
        native_currency: NativeCurrency {
            name: currency.name.to_owned(),
            symbol: currency.symbol.to_owned(),
            decimals: currency.decimals,
        },
        rpc_urls: info.urls.iter().map(|u| (*u).to_owned()).collect(),
        block_explorer_urls: Some(
            info.block_explorer_urls
                .iter()
                .map(|u| (*u).to_owned())
                .collect(),
        ),
        icon_urls: None,
    })
}
