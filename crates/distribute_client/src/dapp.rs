//! The layer a UI talks to.
//!
//! Owns the connection state, the address resolver and the LCD factory, keeps
//! one contract client per session generation and logs every outcome before
//! handing it back.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use distribute_core::DistributeConfig;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::connection::{ActiveSession, ConnectionState, WalletSnapshot};
use crate::contract::{ContractClient, ContractQuerier};
use crate::error::{ClientError, ClientResult};
use crate::lcd::LcdClient;
use crate::msg::Coin;
use crate::network::{Network, NetworkInfo};
use crate::provider::{ConnectType, LedgerRpc, TxReceipt, WalletProvider};
use crate::registry::{AddressResolver, RefsRegistry};
use crate::rpc_config::RpcConfigStore;

/// Builds the ledger RPC for a network.
pub type RpcFactory =
    Arc<dyn Fn(&NetworkInfo) -> ClientResult<Arc<dyn LedgerRpc>> + Send + Sync>;

pub struct DistributeDapp {
    state: Arc<ConnectionState>,
    resolver: Arc<dyn AddressResolver>,
    rpc_factory: RpcFactory,
    contract_name: String,
    query_network: Option<NetworkInfo>,
    client: Mutex<Option<Arc<ContractClient>>>,
}

impl DistributeDapp {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        resolver: Arc<dyn AddressResolver>,
        contract_name: &str,
        rpc_factory: RpcFactory,
    ) -> Self {
        Self {
            state: Arc::new(ConnectionState::new(provider)),
            resolver,
            rpc_factory,
            contract_name: contract_name.to_string(),
            query_network: None,
            client: Mutex::new(None),
        }
    }

    /// Wire everything from the application config: refs file for addresses,
    /// LCD endpoints (with overrides) for queries.
    pub fn from_config(
        provider: Arc<dyn WalletProvider>,
        config: &DistributeConfig,
    ) -> ClientResult<Self> {
        config
            .validate()
            .map_err(|e| ClientError::Config(format!("{e:#}")))?;
        let registry = RefsRegistry::load_from_file(&config.refs_file())
            .map_err(|e| ClientError::Config(format!("{e:#}")))?;
        let store = RpcConfigStore::from_config(config)
            .map_err(|e| ClientError::Config(format!("{e:#}")))?;
        let network = Network::from_name(&config.network)
            .ok_or_else(|| ClientError::Config(format!("unknown network: {}", config.network)))?;
        Ok(Self::new(
            provider,
            Arc::new(registry),
            &config.contract_name,
            lcd_factory(store, config.request_timeout()),
        )
        .with_query_network(network.info()))
    }

    /// Use one RPC for every network.
    pub fn with_rpc(
        provider: Arc<dyn WalletProvider>,
        resolver: Arc<dyn AddressResolver>,
        contract_name: &str,
        rpc: Arc<dyn LedgerRpc>,
    ) -> Self {
        let factory: RpcFactory =
            Arc::new(move |_: &NetworkInfo| -> ClientResult<Arc<dyn LedgerRpc>> {
                Ok(Arc::clone(&rpc))
            });
        Self::new(provider, resolver, contract_name, factory)
    }

    /// Network read-only queries target while no wallet is connected.
    pub fn with_query_network(mut self, network: NetworkInfo) -> Self {
        self.query_network = Some(network);
        self
    }

    pub fn state(&self) -> &Arc<ConnectionState> {
        &self.state
    }

    pub fn contract_name(&self) -> &str {
        &self.contract_name
    }

    // -- Connection ---------------------------------------------------------

    pub fn wallet_status(&self) -> WalletSnapshot {
        let snapshot = self.state.snapshot();
        info!(status = %snapshot.status, network = %snapshot.network, "wallet status");
        snapshot
    }

    /// Connect with the first connection type the provider offers. An empty
    /// offer is reported without touching the provider.
    pub async fn connect_first_available(&self) -> ClientResult<ActiveSession> {
        let Some(connect_type) = self.state.available_connect_types().first().copied() else {
            let err = ClientError::ProviderFailure("no connection types available".into());
            report("connect", &Err::<(), _>(err.clone()));
            return Err(err);
        };
        self.connect(connect_type).await
    }

    pub async fn connect(&self, connect_type: ConnectType) -> ClientResult<ActiveSession> {
        let result = self.state.connect(connect_type).await;
        let outcome = result
            .as_ref()
            .map(|active| active.session.address().to_string())
            .map_err(Clone::clone);
        report("connect", &outcome);
        result
    }

    pub async fn disconnect(&self) -> ClientResult<()> {
        let result = self.state.disconnect().await;
        self.client.lock().take();
        report("disconnect", &result);
        result
    }

    // -- Clients ------------------------------------------------------------

    /// Client for the current session, rebuilt whenever the session generation
    /// or network changed since the last call.
    pub fn contract_client(&self) -> ClientResult<Arc<ContractClient>> {
        let active = self
            .state
            .active_session()
            .ok_or(ClientError::NotConnected)?;

        let mut cached = self.client.lock();
        if let Some(client) = cached.as_ref() {
            if client.generation() == active.generation
                && client.network().same_identity(&active.network)
            {
                return Ok(Arc::clone(client));
            }
        }

        let rpc = (self.rpc_factory)(&active.network)?;
        let address = self.resolver.resolve(&self.contract_name, &active.network)?;
        let client = Arc::new(ContractClient::bind(
            Arc::clone(&self.state),
            active,
            address,
            rpc,
        ));
        *cached = Some(Arc::clone(&client));
        Ok(client)
    }

    /// Read-only handle. Follows the wallet's network while connected,
    /// otherwise the configured query network, otherwise the provider's.
    pub fn querier(&self) -> ClientResult<ContractQuerier> {
        let network = self.query_target();
        let address = self.resolver.resolve(&self.contract_name, &network)?;
        let rpc = (self.rpc_factory)(&network)?;
        Ok(ContractQuerier::new(address, rpc))
    }

    fn query_target(&self) -> NetworkInfo {
        if let Some(active) = self.state.active_session() {
            return active.network;
        }
        match &self.query_network {
            Some(network) => network.clone(),
            None => self.state.network(),
        }
    }

    // -- Operations ---------------------------------------------------------

    pub async fn deposit(&self) -> ClientResult<TxReceipt> {
        let result = match self.contract_client() {
            Ok(client) => client.deposit().await,
            Err(e) => Err(e),
        };
        report("deposit", &result);
        result
    }

    pub async fn deposit_with_funds(&self, funds: Vec<Coin>) -> ClientResult<TxReceipt> {
        let result = match self.contract_client() {
            Ok(client) => client.deposit_with_funds(funds).await,
            Err(e) => Err(e),
        };
        report("deposit", &result);
        result
    }

    pub async fn withdraw(&self, receiver: &str) -> ClientResult<TxReceipt> {
        let result = match self.contract_client() {
            Ok(client) => client.withdraw(receiver).await,
            Err(e) => Err(e),
        };
        report("withdraw", &result);
        result
    }

    pub async fn set_limit(&self, amount: &str) -> ClientResult<TxReceipt> {
        let result = match self.contract_client() {
            Ok(client) => client.set_limit(amount).await,
            Err(e) => Err(e),
        };
        report("set", &result);
        result
    }

    pub async fn set_owner(&self, arbiter: &str) -> ClientResult<TxReceipt> {
        let result = match self.contract_client() {
            Ok(client) => client.set_owner(arbiter).await,
            Err(e) => Err(e),
        };
        report("set_owner", &result);
        result
    }

    /// Ad-hoc query; needs no wallet.
    pub async fn query(&self, payload: &Value) -> ClientResult<Value> {
        let result = match self.querier() {
            Ok(querier) => querier.query(payload).await,
            Err(e) => Err(e),
        };
        report("query", &result);
        result
    }
}

impl fmt::Debug for DistributeDapp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributeDapp")
            .field("state", &self.state)
            .field("contract_name", &self.contract_name)
            .field("query_network", &self.query_network)
            .finish()
    }
}

/// LCD clients built from the endpoint store. One client, and so one
/// connection pool, per LCD URL.
pub fn lcd_factory(store: RpcConfigStore, timeout: std::time::Duration) -> RpcFactory {
    let clients: Mutex<HashMap<String, Arc<LcdClient>>> = Mutex::new(HashMap::new());
    Arc::new(move |network: &NetworkInfo| -> ClientResult<Arc<dyn LedgerRpc>> {
        let url = store.lcd_for(network);
        let mut clients = clients.lock();
        let client = match clients.get(&url) {
            Some(client) => Arc::clone(client),
            None => {
                let client = Arc::new(LcdClient::new(&url, timeout)?);
                clients.insert(url, Arc::clone(&client));
                client
            }
        };
        Ok(client as Arc<dyn LedgerRpc>)
    })
}

/// Every user-triggered action leaves a trace in the log.
fn report<T: fmt::Debug>(operation: &str, result: &ClientResult<T>) {
    match result {
        Ok(value) => info!(operation, outcome = ?value, "operation succeeded"),
        Err(ClientError::NotConnected) => warn!(operation, "Wallet not connected"),
        Err(e) => error!(operation, category = ?e.category(), error = %e, "operation failed"),
    }
}
