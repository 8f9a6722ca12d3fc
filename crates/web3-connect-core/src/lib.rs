pub mod connector;
pub mod context;
pub mod domain;
pub mod ens;
pub mod hooks;
pub mod ports;
pub mod selection;
pub mod store;
pub mod validation;
pub mod wallet_provider;

pub use connector::{
    ActivationRequest, AddEthereumChainParameter, Connector, ConnectorCapabilities, ConnectorKind,
    ErrorHandler, NativeCurrency, WatchAssetParameters,
};
pub use context::{use_web3, ContextUpdates, Web3ContextProvider, Web3ContextValue};
pub use domain::{ConnectionState, ConnectorId, StateUpdate};
pub use ens::{EnsLookup, EnsName, EnsNames};
pub use hooks::{
    initialize_connector, initialize_connector_with, try_initialize_connector, ConnectorHooks,
    ProviderLibrary,
};
pub use ports::{
    Eip1193Provider, EnsResolver, EventEmitter, EventListener, ProviderEvent, ProviderRpcError,
    Web3Error,
};
pub use selection::{InitializedConnector, PriorityConnector, SelectedConnector};
pub use store::{create_store_and_actions, Actions, CancelActivation, Web3Store};
pub use validation::{parse_chain_id, validate_account, validate_chain_id, MAX_SAFE_CHAIN_ID};
pub use wallet_provider::WalletProvider;
