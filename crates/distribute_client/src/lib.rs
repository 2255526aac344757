// Wallet-gated client for the `distribute` contract.

pub mod connection;
pub mod contract;
pub mod dapp;
pub mod error;
pub mod lcd;
pub mod msg;
pub mod network;
pub mod provider;
pub mod registry;
pub mod rpc_config;

#[cfg(test)]
mod test_support;

// Re-export primary types for convenient access.
pub use connection::{ActiveSession, ConnectionState, ConnectionStatus, WalletSnapshot};
pub use contract::{ContractClient, ContractQuerier};
pub use dapp::{DistributeDapp, RpcFactory, lcd_factory};
pub use error::{ClientError, ClientResult, ErrorCategory};
pub use lcd::LcdClient;
pub use msg::{AccountsResponse, Coin, ExecuteMsg, LimitResponse, QueryMsg, RecordsResponse};
pub use network::{Network, NetworkInfo};
pub use provider::{
    ConnectType, LedgerRpc, TransactionRequest, TxReceipt, WalletProvider, WalletSession,
};
pub use registry::{AddressResolver, ContractAddress, ContractRef, RefsRegistry};
pub use rpc_config::{RpcConfig, RpcConfigStore};
