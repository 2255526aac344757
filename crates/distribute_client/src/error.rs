use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for every public operation of this crate.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Outcome of a failed wallet or contract operation.
///
/// Collaborator errors are flattened into their display chain so the outcome
/// stays `Clone` and comparable in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Wallet not connected")]
    NotConnected,

    #[error("Wallet session changed since this client was built")]
    SessionChanged,

    #[error("Wallet provider error: {0}")]
    ProviderFailure(String),

    #[error("Transaction `{operation}` failed: {cause}")]
    TransactionFailure { operation: String, cause: String },

    #[error("Query failed: {0}")]
    QueryFailure(String),

    #[error("Contract address resolution failed: {0}")]
    AddressResolution(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Broad classification used for routing and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// The caller acted without a usable wallet.
    UserError,
    /// The wallet provider or session refused.
    ProviderError,
    /// LCD or broadcast failed on the network side.
    NetworkError,
    /// Invalid or missing configuration.
    ConfigError,
}

impl ClientError {
    pub(crate) fn transaction(operation: &str, cause: impl std::fmt::Display) -> Self {
        Self::TransactionFailure {
            operation: operation.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Returns the broad error category for routing and display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotConnected | Self::SessionChanged => ErrorCategory::UserError,
            Self::ProviderFailure(_) => ErrorCategory::ProviderError,
            Self::TransactionFailure { .. } | Self::QueryFailure(_) => ErrorCategory::NetworkError,
            Self::AddressResolution(_) | Self::Config(_) => ErrorCategory::ConfigError,
        }
    }

    /// Returns a user-friendly message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::NotConnected => "Wallet not connected".into(),
            Self::SessionChanged => "Wallet changed. Please retry.".into(),
            Self::ProviderFailure(_) => "Wallet connection failed or was rejected.".into(),
            Self::TransactionFailure { operation, .. } => {
                format!("The {operation} transaction failed.")
            }
            Self::QueryFailure(_) => "Contract query failed. Check your connection.".into(),
            Self::AddressResolution(_) => "Contract is not deployed on this network.".into(),
            Self::Config(msg) => format!("Configuration issue: {msg}"),
        }
    }

    /// Whether the caller can reasonably retry the same action.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::AddressResolution(_) | Self::Config(_))
    }
}
