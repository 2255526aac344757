#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use distribute_client::*;
use parking_lot::Mutex;
use serde_json::Value;

pub const WALLET: &str = "terra1userwallet00000000000000000000000000";
pub const CONTRACT: &str = "terra1distribute00000000000000000000000000000000000";

/// Records every broadcast; fails them when `cause` is set.
pub struct RecordingSession {
    network: NetworkInfo,
    cause: Option<String>,
    pub requests: Mutex<Vec<TransactionRequest>>,
}

#[async_trait]
impl WalletSession for RecordingSession {
    fn address(&self) -> &str {
        WALLET
    }

    fn network(&self) -> &NetworkInfo {
        &self.network
    }

    async fn execute(&self, request: &TransactionRequest) -> anyhow::Result<TxReceipt> {
        self.requests.lock().push(request.clone());
        match &self.cause {
            Some(cause) => anyhow::bail!("{cause}"),
            None => Ok(TxReceipt {
                txhash: "E3B0C44298FC1C149AFBF4C8996FB924".into(),
                height: Some(4_200_000),
                raw_log: Some("[]".into()),
            }),
        }
    }
}

/// Browser-extension stand-in that only accepts the types it advertises.
pub struct ExtensionProvider {
    types: Vec<ConnectType>,
    session: Arc<RecordingSession>,
    connected: Mutex<bool>,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl ExtensionProvider {
    pub fn new(types: Vec<ConnectType>) -> Self {
        Self::on_network(types, Network::Testnet.info(), None)
    }

    pub fn on_network(types: Vec<ConnectType>, network: NetworkInfo, cause: Option<&str>) -> Self {
        Self {
            types,
            session: Arc::new(RecordingSession {
                network,
                cause: cause.map(str::to_string),
                requests: Mutex::new(Vec::new()),
            }),
            connected: Mutex::new(false),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> Vec<TransactionRequest> {
        self.session.requests.lock().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for ExtensionProvider {
    fn status(&self) -> ConnectionStatus {
        if *self.connected.lock() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }

    fn network(&self) -> NetworkInfo {
        self.session.network.clone()
    }

    fn available_connect_types(&self) -> Vec<ConnectType> {
        self.types.clone()
    }

    async fn connect(&self, connect_type: ConnectType) -> anyhow::Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.types.contains(&connect_type) {
            anyhow::bail!("{connect_type:?} is not an available connect type");
        }
        *self.connected.lock() = true;
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        *self.connected.lock() = false;
        Ok(())
    }

    fn connected_wallet(&self) -> Option<Arc<dyn WalletSession>> {
        if *self.connected.lock() {
            let session: Arc<dyn WalletSession> = self.session.clone();
            Some(session)
        } else {
            None
        }
    }
}

/// LCD stand-in answering every query with the same data.
pub struct StaticLcd {
    data: Value,
    pub queries: Mutex<Vec<Value>>,
}

impl StaticLcd {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn query_count(&self) -> usize {
        self.queries.lock().len()
    }
}

#[async_trait]
impl LedgerRpc for StaticLcd {
    async fn contract_query(
        &self,
        _address: &ContractAddress,
        query: &Value,
    ) -> anyhow::Result<Value> {
        self.queries.lock().push(query.clone());
        Ok(self.data.clone())
    }
}

pub fn registry() -> RefsRegistry {
    let mut registry = RefsRegistry::new();
    registry.insert("testnet", "distribute", CONTRACT);
    registry
}

pub fn dapp(provider: &Arc<ExtensionProvider>, lcd: &Arc<StaticLcd>) -> DistributeDapp {
    DistributeDapp::with_rpc(
        provider.clone(),
        Arc::new(registry()),
        "distribute",
        lcd.clone(),
    )
}
