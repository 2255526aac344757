//! In-process doubles for the collaborator traits, shared by unit tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::{Notify, oneshot};

use crate::connection::ConnectionStatus;
use crate::network::{Network, NetworkInfo};
use crate::provider::{
    ConnectType, LedgerRpc, TransactionRequest, TxReceipt, WalletProvider, WalletSession,
};
use crate::registry::ContractAddress;

pub struct MockSession {
    address: String,
    network: NetworkInfo,
    failure: Option<String>,
    requests: Mutex<Vec<TransactionRequest>>,
}

impl MockSession {
    pub fn new(address: &str, network: NetworkInfo) -> Self {
        Self {
            address: address.into(),
            network,
            failure: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, cause: &str) -> Self {
        self.failure = Some(cause.into());
        self
    }

    pub fn requests(&self) -> Vec<TransactionRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl WalletSession for MockSession {
    fn address(&self) -> &str {
        &self.address
    }

    fn network(&self) -> &NetworkInfo {
        &self.network
    }

    async fn execute(&self, request: &TransactionRequest) -> anyhow::Result<TxReceipt> {
        let count = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len()
        };
        if let Some(cause) = &self.failure {
            anyhow::bail!("{cause}");
        }
        Ok(TxReceipt {
            txhash: format!("TX{count}"),
            height: Some(100 + count as u64),
            raw_log: None,
        })
    }
}

pub struct MockProvider {
    types: Vec<ConnectType>,
    reject: bool,
    fail_disconnect: bool,
    session: Arc<MockSession>,
    connected: Mutex<bool>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    connect_started: Notify,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl MockProvider {
    pub const ADDRESS: &'static str = "terra1mockwallet000000000000000000000000000";

    pub fn new() -> Self {
        Self::with_session(Arc::new(MockSession::new(
            Self::ADDRESS,
            Network::Testnet.info(),
        )))
    }

    pub fn with_session(session: Arc<MockSession>) -> Self {
        Self {
            types: vec![ConnectType::Extension, ConnectType::WalletConnect],
            reject: false,
            fail_disconnect: false,
            session,
            connected: Mutex::new(false),
            gate: Mutex::new(None),
            connect_started: Notify::new(),
            connects: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    pub fn with_types(mut self, types: Vec<ConnectType>) -> Self {
        self.types = types;
        self
    }

    pub fn rejecting(mut self) -> Self {
        self.reject = true;
        self
    }

    pub fn failing_disconnect(mut self) -> Self {
        self.fail_disconnect = true;
        self
    }

    pub fn session(&self) -> &Arc<MockSession> {
        &self.session
    }

    /// Park the next handshake until the returned sender fires.
    pub fn hold_next_connect(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock() = Some(rx);
        tx
    }

    pub async fn wait_for_connect_call(&self) {
        self.connect_started.notified().await;
    }

    pub fn connect_calls(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_calls(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletProvider for MockProvider {
    fn status(&self) -> ConnectionStatus {
        if *self.connected.lock() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }

    fn network(&self) -> NetworkInfo {
        self.session.network().clone()
    }

    fn available_connect_types(&self) -> Vec<ConnectType> {
        self.types.clone()
    }

    async fn connect(&self, connect_type: ConnectType) -> anyhow::Result<()> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().take();
        self.connect_started.notify_one();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        if self.reject {
            anyhow::bail!("user rejected the connection");
        }
        if !self.types.contains(&connect_type) {
            anyhow::bail!("connect type {connect_type:?} is not available");
        }
        *self.connected.lock() = true;
        Ok(())
    }

    async fn disconnect(&self) -> anyhow::Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        *self.connected.lock() = false;
        if self.fail_disconnect {
            anyhow::bail!("extension did not respond");
        }
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

pub struct MockRpc {
    response: Value,
    failure: Option<String>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockRpc {
    pub fn returning(response: Value) -> Self {
        Self {
            response,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(cause: &str) -> Self {
        Self {
            response: Value::Null,
            failure: Some(cause.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LedgerRpc for MockRpc {
    async fn contract_query(
        &self,
        address: &ContractAddress,
        query: &Value,
    ) -> anyhow::Result<Value> {
        self.calls
            .lock()
            .push((address.as_str().to_string(), query.clone()));
        if let Some(cause) = &self.failure {
            anyhow::bail!("{cause}");
        }
        Ok(self.response.clone())
    }
}
