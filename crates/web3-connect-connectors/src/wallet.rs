//! Request and event plumbing shared by the wallet-backed connectors.

use std::sync::Arc;

use serde_json::{json, Value};

use web3_connect_core::validation::to_hex_chain_id;
use web3_connect_core::{
    parse_chain_id, ActivationRequest, Actions, AddEthereumChainParameter, Eip1193Provider,
    ErrorHandler, ProviderEvent, ProviderRpcError, StateUpdate, Web3Error,
};

/// Mirrors provider events into the store.
pub(crate) fn listen(
    provider: &dyn Eip1193Provider,
    actions: Actions,
    on_error: Option<ErrorHandler>,
) {
    provider.on(Arc::new(move |event: &ProviderEvent| {
        let result = match event {
            ProviderEvent::Connect { chain_id } | ProviderEvent::ChainChanged(chain_id) => {
                parse_chain_id(chain_id).and_then(|id| actions.update(StateUpdate::chain(id)))
            }
            ProviderEvent::Disconnect(err) => {
                actions.reset_state();
                Err(Web3Error::Rpc(err.clone()))
            }
            ProviderEvent::AccountsChanged(accounts) if accounts.is_empty() => {
                actions.reset_state();
                Ok(())
            }
            ProviderEvent::AccountsChanged(accounts) => {
                actions.update(StateUpdate::accounts(accounts.iter().cloned()))
            }
        };
        if let Err(e) = result {
            tracing::debug!(connector = %actions.connector_id(), error = %e, "provider event");
            if let Some(handler) = &on_error {
                handler(&e);
            }
        }
    }));
}

pub(crate) fn accounts_from(value: Value, method: &str) -> Result<Vec<String>, Web3Error> {
    let arr = match value {
        Value::Array(arr) => arr,
        other => {
            return Err(Web3Error::Validation(format!(
                "{method}: array expected, got {other}"
            )))
        }
    };
    arr.into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(Web3Error::Validation(format!(
                "{method}: string expected, got {other}"
            ))),
        })
        .collect()
}

pub(crate) async fn chain_id(provider: &dyn Eip1193Provider) -> Result<u64, Web3Error> {
    let raw = provider.request("eth_chainId", json!([])).await?;
    parse_chain_id(&raw)
}

pub(crate) async fn accounts(provider: &dyn Eip1193Provider) -> Result<Vec<String>, Web3Error> {
    let raw = provider.request("eth_accounts", json!([])).await?;
    accounts_from(raw, "eth_accounts")
}

pub(crate) async fn request_accounts(
    provider: &dyn Eip1193Provider,
) -> Result<Vec<String>, Web3Error> {
    let raw = provider.request("eth_requestAccounts", json!([])).await?;
    accounts_from(raw, "eth_requestAccounts")
}

/// Asks the wallet to move to `chain_id`. With `add`, a chain the wallet
/// does not know yet (4902) is added instead.
pub(crate) async fn switch_chain(
    provider: &dyn Eip1193Provider,
    chain_id: u64,
    add: Option<&AddEthereumChainParameter>,
) -> Result<(), Web3Error> {
    let params = json!([{ "chainId": to_hex_chain_id(chain_id) }]);
    match provider.request("wallet_switchEthereumChain", params).await {
        Ok(_) => Ok(()),
        Err(e) if e.code == ProviderRpcError::UNRECOGNIZED_CHAIN => match add {
            Some(add) => {
                tracing::info!(chain_id, "adding chain to wallet");
                provider
                    .request("wallet_addEthereumChain", json!([add.to_rpc_value()]))
                    .await?;
                Ok(())
            }
            None => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

/// Reads the wallet's chain, switches to the requested one if needed, and
/// reports the connection.
pub(crate) async fn settle_chain(
    provider: &dyn Eip1193Provider,
    actions: &Actions,
    request: &ActivationRequest,
    accounts: Vec<String>,
) -> Result<(), Web3Error> {
    let current = chain_id(provider).await?;
    let desired = match request.desired_chain_id() {
        Some(desired) if desired != current => desired,
        _ => return actions.update(StateUpdate::connected(current, accounts)),
    };

    let add = match request {
        ActivationRequest::AddChain(params) => Some(params),
        _ => None,
    };
    switch_chain(provider, desired, add).await?;
    let mut current = chain_id(provider).await?;
    if current != desired && add.is_some() {
        switch_chain(provider, desired, None).await?;
        current = chain_id(provider).await?;
    }
    if current != desired {
        return Err(Web3Error::NetworkMismatch {
            expected: desired,
            actual: current,
        });
    }
    actions.update(StateUpdate::connected(current, accounts))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accounts_must_be_string_array() {
        let accounts = accounts_from(json!(["0xabc"]), "eth_accounts").expect("accounts");
        assert_eq!(accounts, vec!["0xabc".to_owned()]);
        assert!(accounts_from(json!("0xabc"), "eth_accounts").is_err());
        assert!(accounts_from(json!([1]), "eth_accounts").is_err());
    }
}
