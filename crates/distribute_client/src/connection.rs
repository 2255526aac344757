//! Wallet connection state machine.
//!
//! `DISCONNECTED -> CONNECTING -> CONNECTED` on a successful handshake,
//! `CONNECTING -> DISCONNECTED` on rejection, and any state back to
//! `DISCONNECTED` on disconnect. Each connect or disconnect that changes the
//! active session bumps a generation counter so clients can tell whether the
//! session they were built for is still the current one.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::network::NetworkInfo;
use crate::provider::{ConnectType, WalletProvider, WalletSession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConnectionStatus::Disconnected => "disconnected",
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
        };
        f.write_str(label)
    }
}

/// The session a connect produced, tagged with its generation.
#[derive(Clone)]
pub struct ActiveSession {
    pub session: Arc<dyn WalletSession>,
    pub network: NetworkInfo,
    pub generation: u64,
}

impl fmt::Debug for ActiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSession")
            .field("address", &self.session.address())
            .field("network", &self.network)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Serializable view of the connection for status displays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSnapshot {
    pub status: ConnectionStatus,
    pub network: NetworkInfo,
    pub address: Option<String>,
    pub connect_type: Option<ConnectType>,
    pub connected_at: Option<DateTime<Utc>>,
    pub available_connect_types: Vec<ConnectType>,
    pub generation: u64,
}

#[derive(Default)]
struct Inner {
    status: ConnectionStatus,
    session: Option<Arc<dyn WalletSession>>,
    network: Option<NetworkInfo>,
    connect_type: Option<ConnectType>,
    connected_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl Inner {
    fn active(&self) -> Option<ActiveSession> {
        if self.status != ConnectionStatus::Connected {
            return None;
        }
        let session = self.session.clone()?;
        let network = self
            .network
            .clone()
            .unwrap_or_else(|| session.network().clone());
        Some(ActiveSession {
            session,
            network,
            generation: self.generation,
        })
    }

    fn reset(&mut self) {
        self.status = ConnectionStatus::Disconnected;
        self.session = None;
        self.network = None;
        self.connect_type = None;
        self.connected_at = None;
    }
}

/// Single source of truth for whether a wallet is usable.
///
/// Shared by `Arc` between whatever builds contract clients and the clients
/// themselves. All reads and writes go through one lock; the lock is never
/// held across a provider call.
pub struct ConnectionState {
    provider: Arc<dyn WalletProvider>,
    inner: RwLock<Inner>,
}

impl ConnectionState {
    pub fn new(provider: Arc<dyn WalletProvider>) -> Self {
        Self {
            provider,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn provider(&self) -> &Arc<dyn WalletProvider> {
        &self.provider
    }

    /// Current status. No side effects.
    pub fn status(&self) -> ConnectionStatus {
        self.inner.read().status
    }

    pub fn generation(&self) -> u64 {
        self.inner.read().generation
    }

    /// The active session, only while `CONNECTED`.
    pub fn active_session(&self) -> Option<ActiveSession> {
        self.inner.read().active()
    }

    /// Network of the active session, or the provider's network otherwise.
    pub fn network(&self) -> NetworkInfo {
        let from_session = self.inner.read().network.clone();
        from_session.unwrap_or_else(|| self.provider.network())
    }

    /// Connection types the provider offers right now.
    pub fn available_connect_types(&self) -> Vec<ConnectType> {
        self.provider.available_connect_types()
    }

    pub fn snapshot(&self) -> WalletSnapshot {
        let available_connect_types = self.provider.available_connect_types();
        let network = self.network();
        let inner = self.inner.read();
        WalletSnapshot {
            status: inner.status,
            network,
            address: inner.session.as_ref().map(|s| s.address().to_string()),
            connect_type: inner.connect_type,
            connected_at: inner.connected_at,
            available_connect_types,
            generation: inner.generation,
        }
    }

    /// Succeeds only while `CONNECTED` on the given generation and the
    /// provider still reports a live wallet.
    ///
    /// A wallet the provider dropped on its own (extension locked, user
    /// disconnected from the wallet UI) resets local state and ends the
    /// generation.
    pub fn ensure_current(&self, generation: u64) -> ClientResult<()> {
        {
            let inner = self.inner.read();
            if inner.status != ConnectionStatus::Connected {
                return Err(ClientError::NotConnected);
            }
            if inner.generation != generation {
                return Err(ClientError::SessionChanged);
            }
        }

        let provider_status = self.provider.status();
        if provider_status == ConnectionStatus::Connected {
            return Ok(());
        }

        let mut inner = self.inner.write();
        if inner.status == ConnectionStatus::Connected && inner.generation == generation {
            inner.reset();
            inner.generation += 1;
            warn!(%provider_status, generation = inner.generation, "provider dropped the wallet, session closed");
        }
        Err(ClientError::NotConnected)
    }

    /// Run the provider handshake.
    ///
    /// Already `CONNECTED` is a no-op returning the current session. A second
    /// connect while a handshake is in flight is rejected and leaves that
    /// handshake alone.
    pub async fn connect(&self, connect_type: ConnectType) -> ClientResult<ActiveSession> {
        let epoch = {
            let mut inner = self.inner.write();
            match inner.status {
                ConnectionStatus::Connected => {
                    if let Some(active) = inner.active() {
                        debug!(?connect_type, "connect ignored, wallet already connected");
                        return Ok(active);
                    }
                    // Connected without a session cannot be reached through
                    // this type; treat it as disconnected.
                    inner.reset();
                }
                ConnectionStatus::Connecting => {
                    return Err(ClientError::ProviderFailure(
                        "a connection handshake is already in progress".into(),
                    ));
                }
                ConnectionStatus::Disconnected => {}
            }
            inner.status = ConnectionStatus::Connecting;
            inner.generation
        };

        info!(?connect_type, "connecting wallet");
        let outcome = self.provider.connect(connect_type).await;
        let session = match &outcome {
            Ok(()) => self.provider.connected_wallet(),
            Err(_) => None,
        };

        let handshake_ok = outcome.is_ok();
        if let Some(result) = self.settle(epoch, connect_type, outcome, session) {
            return result;
        }

        warn!(?connect_type, "handshake finished after disconnect, discarding");
        if handshake_ok {
            // The provider opened a session nobody owns any more.
            if let Err(e) = self.provider.disconnect().await {
                warn!(error = %format!("{e:#}"), "teardown of discarded session failed");
            }
        }
        Err(ClientError::ProviderFailure(
            "connection cancelled by disconnect".into(),
        ))
    }

    /// Apply a finished handshake. `None` when a disconnect ended the
    /// handshake's generation in the meantime.
    fn settle(
        &self,
        epoch: u64,
        connect_type: ConnectType,
        outcome: anyhow::Result<()>,
        session: Option<Arc<dyn WalletSession>>,
    ) -> Option<ClientResult<ActiveSession>> {
        let mut inner = self.inner.write();
        if inner.generation != epoch || inner.status != ConnectionStatus::Connecting {
            return None;
        }

        if let Err(e) = outcome {
            inner.reset();
            warn!(?connect_type, error = %format!("{e:#}"), "wallet connection failed");
            return Some(Err(ClientError::ProviderFailure(format!("{e:#}"))));
        }

        let Some(session) = session else {
            inner.reset();
            warn!(?connect_type, "provider reported success without a wallet");
            return Some(Err(ClientError::ProviderFailure(
                "provider reported success but exposed no wallet".into(),
            )));
        };

        let network = session.network().clone();
        inner.generation += 1;
        inner.status = ConnectionStatus::Connected;
        inner.session = Some(Arc::clone(&session));
        inner.network = Some(network.clone());
        inner.connect_type = Some(connect_type);
        inner.connected_at = Some(Utc::now());
        info!(
            address = %session.address(),
            network = %network,
            generation = inner.generation,
            "wallet connected"
        );

        Some(Ok(ActiveSession {
            session,
            network,
            generation: inner.generation,
        }))
    }

    /// Tear down the connection. Calling it while disconnected is a no-op.
    ///
    /// Local state flips to `DISCONNECTED` before the provider is asked, so
    /// calls starting after this point already see it. A provider failure is
    /// still reported.
    pub async fn disconnect(&self) -> ClientResult<()> {
        {
            let mut inner = self.inner.write();
            if inner.status == ConnectionStatus::Disconnected {
                debug!("disconnect ignored, wallet already disconnected");
                return Ok(());
            }
            inner.reset();
            inner.generation += 1;
        }

        info!("disconnecting wallet");
        self.provider.disconnect().await.map_err(|e| {
            warn!(error = %format!("{e:#}"), "wallet teardown failed");
            ClientError::ProviderFailure(format!("{e:#}"))
        })?;
        info!("wallet disconnected");
        Ok(())
    }
}

impl fmt::Debug for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("ConnectionState")
            .field("status", &inner.status)
            .field("generation", &inner.generation)
            .finish()
    }
}
