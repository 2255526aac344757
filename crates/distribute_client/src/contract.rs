use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::connection::{ActiveSession, ConnectionState};
use crate::error::{ClientError, ClientResult};
use crate::msg::{
    AccountsResponse, Coin, ExecuteMsg, LimitResponse, QueryMsg, RecordsResponse,
};
use crate::network::NetworkInfo;
use crate::provider::{LedgerRpc, TransactionRequest, TxReceipt, WalletSession};
use crate::registry::{AddressResolver, ContractAddress};

// ---------------------------------------------------------------------------
// Read-only access
// ---------------------------------------------------------------------------

/// Queries against one contract. Needs no wallet.
#[derive(Clone)]
pub struct ContractQuerier {
    address: ContractAddress,
    rpc: Arc<dyn LedgerRpc>,
}

impl ContractQuerier {
    pub fn new(address: ContractAddress, rpc: Arc<dyn LedgerRpc>) -> Self {
        Self { address, rpc }
    }

    pub fn address(&self) -> &ContractAddress {
        &self.address
    }

    /// Run an arbitrary query object and return the decoded JSON answer.
    pub async fn query(&self, payload: &Value) -> ClientResult<Value> {
        debug!(contract = %self.address, query = %payload, "querying contract");
        self.rpc
            .contract_query(&self.address, payload)
            .await
            .map_err(|e| {
                warn!(contract = %self.address, error = %format!("{e:#}"), "contract query failed");
                ClientError::QueryFailure(format!("{e:#}"))
            })
    }

    /// Run a schema query and decode the answer into `T`.
    pub async fn query_msg<T: DeserializeOwned>(&self, msg: &QueryMsg) -> ClientResult<T> {
        let payload = serde_json::to_value(msg)
            .map_err(|e| ClientError::QueryFailure(format!("failed to encode query: {e}")))?;
        let data = self.query(&payload).await?;
        serde_json::from_value(data).map_err(|e| {
            warn!(contract = %self.address, error = %e, "malformed query response");
            ClientError::QueryFailure(format!("malformed response: {e}"))
        })
    }

    pub async fn accounts(&self) -> ClientResult<AccountsResponse> {
        self.query_msg(&QueryMsg::Accounts {}).await
    }

    pub async fn records(&self) -> ClientResult<RecordsResponse> {
        self.query_msg(&QueryMsg::Records {}).await
    }

    pub async fn limit(&self) -> ClientResult<LimitResponse> {
        self.query_msg(&QueryMsg::Limit {}).await
    }
}

impl fmt::Debug for ContractQuerier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractQuerier")
            .field("address", &self.address)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Wallet-bound client
// ---------------------------------------------------------------------------

/// A contract bound to one wallet session.
///
/// Immutable once built. When the session or network changes the owner must
/// build a new one; an outdated client reports `SessionChanged` instead of
/// signing with a wallet that is no longer active.
pub struct ContractClient {
    state: Arc<ConnectionState>,
    session: Arc<dyn WalletSession>,
    network: NetworkInfo,
    generation: u64,
    querier: ContractQuerier,
}

impl ContractClient {
    /// Build a client for the active session, resolving `contract_name` on its
    /// network. Fails when no wallet is connected or the contract has no
    /// deployment there.
    pub fn connect(
        state: Arc<ConnectionState>,
        resolver: &dyn AddressResolver,
        contract_name: &str,
        rpc: Arc<dyn LedgerRpc>,
    ) -> ClientResult<Self> {
        let active = state.active_session().ok_or(ClientError::NotConnected)?;
        let address = resolver.resolve(contract_name, &active.network)?;
        Ok(Self::bind(state, active, address, rpc))
    }

    /// Build a client from parts that are already resolved.
    pub fn bind(
        state: Arc<ConnectionState>,
        active: ActiveSession,
        address: ContractAddress,
        rpc: Arc<dyn LedgerRpc>,
    ) -> Self {
        debug!(
            contract = %address,
            wallet = %active.session.address(),
            generation = active.generation,
            "contract client bound"
        );
        Self {
            state,
            session: active.session,
            network: active.network,
            generation: active.generation,
            querier: ContractQuerier::new(address, rpc),
        }
    }

    pub fn address(&self) -> &ContractAddress {
        self.querier.address()
    }

    pub fn network(&self) -> &NetworkInfo {
        &self.network
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn wallet_address(&self) -> &str {
        self.session.address()
    }

    pub fn querier(&self) -> &ContractQuerier {
        &self.querier
    }

    /// Deposit with no funds attached.
    pub async fn deposit(&self) -> ClientResult<TxReceipt> {
        self.execute(ExecuteMsg::Deposit {}, Vec::new()).await
    }

    /// Deposit carrying native funds.
    pub async fn deposit_with_funds(&self, funds: Vec<Coin>) -> ClientResult<TxReceipt> {
        self.execute(ExecuteMsg::Deposit {}, funds).await
    }

    /// Withdraw to `receiver`. The address is passed through unchecked; the
    /// contract validates it.
    pub async fn withdraw(&self, receiver: &str) -> ClientResult<TxReceipt> {
        let msg = ExecuteMsg::Withdraw {
            receiver: receiver.to_string(),
        };
        self.execute(msg, Vec::new()).await
    }

    /// Set the deposit limit. `amount` is sent verbatim.
    pub async fn set_limit(&self, amount: &str) -> ClientResult<TxReceipt> {
        let msg = ExecuteMsg::Set {
            amount: amount.to_string(),
        };
        self.execute(msg, Vec::new()).await
    }

    /// Hand the arbiter role to another address.
    pub async fn set_owner(&self, arbiter: &str) -> ClientResult<TxReceipt> {
        let msg = ExecuteMsg::SetOwner {
            arbiter: arbiter.to_string(),
        };
        self.execute(msg, Vec::new()).await
    }

    /// Read-only query; works whatever the connection status.
    pub async fn query(&self, payload: &Value) -> ClientResult<Value> {
        self.querier.query(payload).await
    }

    pub async fn accounts(&self) -> ClientResult<AccountsResponse> {
        self.querier.accounts().await
    }

    pub async fn records(&self) -> ClientResult<RecordsResponse> {
        self.querier.records().await
    }

    pub async fn limit(&self) -> ClientResult<LimitResponse> {
        self.querier.limit().await
    }

    async fn execute(&self, msg: ExecuteMsg, funds: Vec<Coin>) -> ClientResult<TxReceipt> {
        let operation = msg.operation();
        if let Err(e) = self.state.ensure_current(self.generation) {
            warn!(operation, error = %e, "contract call skipped");
            return Err(e);
        }

        let request = TransactionRequest::new(self.address().clone(), &msg, funds);
        info!(
            operation,
            request_id = %request.id,
            contract = %request.contract,
            wallet = %self.session.address(),
            "submitting contract call"
        );

        match self.session.execute(&request).await {
            Ok(receipt) => {
                info!(operation, request_id = %request.id, txhash = %receipt.txhash, "contract call broadcast");
                Ok(receipt)
            }
            Err(e) => {
                let cause = format!("{e:#}");
                warn!(operation, request_id = %request.id, error = %cause, "contract call failed");
                Err(ClientError::transaction(operation, cause))
            }
        }
    }
}

impl fmt::Debug for ContractClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractClient")
            .field("address", self.address())
            .field("wallet", &self.session.address())
            .field("network", &self.network)
            .field("generation", &self.generation)
            .finish()
    }
}
