//! Collaborator interfaces.
//!
//! The wallet provider, its sessions and the ledger RPC are owned outside this
//! crate. Everything here talks to them through the traits below so they can
//! be swapped for a browser bridge, a keyring or a test double.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::connection::ConnectionStatus;
use crate::msg::{Coin, ExecuteMsg};
use crate::network::NetworkInfo;
use crate::registry::ContractAddress;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ways a wallet provider can attach to a wallet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectType {
    Extension,
    WalletConnect,
    ReadOnly,
}

/// One contract execution, built per call and dropped once the session
/// returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub id: Uuid,
    pub operation: String,
    pub payload: Value,
    pub contract: ContractAddress,
    pub funds: Vec<Coin>,
}

impl TransactionRequest {
    pub fn new(contract: ContractAddress, msg: &ExecuteMsg, funds: Vec<Coin>) -> Self {
        Self {
            id: Uuid::new_v4(),
            operation: msg.operation().to_string(),
            payload: msg.payload(),
            contract,
            funds,
        }
    }

    /// The execute message as the contract receives it: `{operation: payload}`.
    pub fn execute_msg(&self) -> Value {
        let mut body = serde_json::Map::new();
        body.insert(self.operation.clone(), self.payload.clone());
        Value::Object(body)
    }
}

/// What a session reports after broadcasting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub txhash: String,
    #[serde(default)]
    pub height: Option<u64>,
    #[serde(default)]
    pub raw_log: Option<String>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// An authenticated handle to one wallet.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// Public address of the wallet.
    fn address(&self) -> &str;

    /// Network the wallet is attached to.
    fn network(&self) -> &NetworkInfo;

    /// Sign and broadcast a contract execution.
    async fn execute(&self, request: &TransactionRequest) -> anyhow::Result<TxReceipt>;
}

/// The wallet provider (browser extension, WalletConnect bridge, ...).
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Provider's own view of the connection.
    fn status(&self) -> ConnectionStatus;

    /// Network the provider is currently pointed at.
    fn network(&self) -> NetworkInfo;

    /// Connection types the provider can offer right now. May be empty.
    fn available_connect_types(&self) -> Vec<ConnectType>;

    /// Run the connection handshake. Resolves once the user approved.
    async fn connect(&self, connect_type: ConnectType) -> anyhow::Result<()>;

    /// Tear the connection down.
    async fn disconnect(&self) -> anyhow::Result<()>;

    /// The session opened by the last successful handshake.
    fn connected_wallet(&self) -> Option<Arc<dyn WalletSession>>;
}

/// Read-only access to contract state. Needs no wallet.
#[async_trait]
pub trait LedgerRpc: Send + Sync {
    async fn contract_query(&self, address: &ContractAddress, query: &Value)
    -> anyhow::Result<Value>;
}
