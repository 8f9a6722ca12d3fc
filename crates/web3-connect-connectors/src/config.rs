use std::collections::BTreeMap;

use web3_connect_core::validation::parse_chain_id_str;
use web3_connect_core::Web3Error;

const RPC_URL_PREFIX: &str = "WEB3_CONNECT_RPC_URL_";

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorConfig {
    /// JSON-RPC endpoints per chain, tried in order.
    pub rpc_urls: BTreeMap<u64, Vec<String>>,
    pub default_chain_id: Option<u64>,
    pub rpc_timeout_ms: u64,
    pub eip1193_proxy_url: Option<String>,
    pub lookup_ens: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            rpc_urls: BTreeMap::new(),
            default_chain_id: None,
            rpc_timeout_ms: 15_000,
            eip1193_proxy_url: None,
            lookup_ens: true,
        }
    }
}

impl ConnectorConfig {
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars())
    }

    /// Builds a config from `(name, value)` pairs. Malformed values are logged
    /// and skipped.
    pub fn from_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut cfg = Self::default();
        for (name, value) in vars {
            if let Some(chain) = name.strip_prefix(RPC_URL_PREFIX) {
                match parse_chain_id_str(chain) {
                    Ok(chain_id) => {
                        let urls = split_urls(&value);
                        if !urls.is_empty() {
                            cfg.rpc_urls.insert(chain_id, urls);
                        }
                    }
                    Err(e) => tracing::warn!(var = %name, error = %e, "ignoring rpc url variable"),
                }
                continue;
            }
            match name.as_str() {
                "WEB3_CONNECT_DEFAULT_CHAIN" => match parse_chain_id_str(value.trim()) {
                    Ok(chain_id) => cfg.default_chain_id = Some(chain_id),
                    Err(e) => tracing::warn!(error = %e, "ignoring WEB3_CONNECT_DEFAULT_CHAIN"),
                },
                "WEB3_CONNECT_RPC_TIMEOUT_MS" => match value.trim().parse() {
                    Ok(ms) => cfg.rpc_timeout_ms = ms,
                    Err(e) => tracing::warn!(error = %e, "ignoring WEB3_CONNECT_RPC_TIMEOUT_MS"),
                },
                "WEB3_CONNECT_EIP1193_PROXY_URL" => {
                    let url = value.trim();
                    if !url.is_empty() {
                        cfg.eip1193_proxy_url = Some(url.to_owned());
                    }
                }
                "WEB3_CONNECT_LOOKUP_ENS" => {
                    cfg.lookup_ens = !matches!(
                        value.trim().to_ascii_lowercase().as_str(),
                        "0" | "false" | "no" | "off"
                    );
                }
                _ => {}
            }
        }
        cfg
    }

    /// The configured default chain, or the lowest configured chain id.
    pub fn default_chain(&self) -> Result<u64, Web3Error> {
        if let Some(chain_id) = self.default_chain_id {
            return Ok(chain_id);
        }
        self.rpc_urls
            .keys()
            .next()
            .copied()
            .ok_or_else(|| Web3Error::Validation("no rpc urls configured".to_owned()))
    }
}

fn split_urls(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
