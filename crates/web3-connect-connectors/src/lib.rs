pub mod chains;
pub mod coinbase;
pub mod config;
pub mod eip1193;
pub mod empty;
pub mod gnosis_safe;
pub mod injected;
pub mod json_rpc;
pub mod network;
pub mod url;
pub mod walletconnect;

mod wallet;

pub use coinbase::{CoinbaseWallet, CoinbaseWalletOptions, CoinbaseWalletSdk};
pub use config::ConnectorConfig;
pub use eip1193::Eip1193;
pub use empty::Empty;
pub use gnosis_safe::{GnosisSafe, SafeAppsSdk, SafeInfo};
pub use injected::Injected;
pub use json_rpc::JsonRpcProvider;
pub use network::Network;
pub use url::Url;
pub use walletconnect::{WalletConnect, WalletConnectClient, WalletConnectOptions};
