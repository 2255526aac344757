use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ClientError, ClientResult};
use crate::network::NetworkInfo;

/// Address of a deployed contract. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractAddress(String);

impl ContractAddress {
    pub fn new(address: impl Into<String>) -> ClientResult<Self> {
        let address = address.into();
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(ClientError::AddressResolution(
                "contract address is empty".into(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ContractAddress {
    type Error = ClientError;

    fn try_from(value: String) -> ClientResult<Self> {
        Self::new(value)
    }
}

impl From<ContractAddress> for String {
    fn from(value: ContractAddress) -> Self {
        value.0
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a logical contract name on a network to its deployed address.
pub trait AddressResolver: Send + Sync {
    fn resolve(&self, contract: &str, network: &NetworkInfo) -> ClientResult<ContractAddress>;
}

/// One contract entry of a terrain refs file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractRef {
    #[serde(default)]
    pub code_id: Option<String>,
    #[serde(default)]
    pub contract_addresses: HashMap<String, String>,
}

/// Contract addresses read from a terrain `refs.terrain.json`:
/// `{ network: { contract: { codeId, contractAddresses: { instance: addr } } } }`.
///
/// The `default` instance is the one resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RefsRegistry {
    networks: HashMap<String, HashMap<String, ContractRef>>,
}

const DEFAULT_INSTANCE: &str = "default";

impl RefsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a refs file. Returns an empty registry if the file does not exist.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "refs file not found, starting empty");
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path).context("failed to read refs file")?;
        let registry: Self = serde_json::from_str(&json).context("failed to parse refs file")?;
        info!(path = %path.display(), networks = registry.networks.len(), "contract refs loaded");
        Ok(registry)
    }

    /// Record the default instance address of `contract` on `network`.
    pub fn insert(&mut self, network: &str, contract: &str, address: impl Into<String>) {
        self.networks
            .entry(network.to_string())
            .or_default()
            .entry(contract.to_string())
            .or_default()
            .contract_addresses
            .insert(DEFAULT_INSTANCE.to_string(), address.into());
    }

    pub fn get(&self, network: &str, contract: &str) -> Option<&ContractRef> {
        self.networks.get(network)?.get(contract)
    }
}

impl AddressResolver for RefsRegistry {
    fn resolve(&self, contract: &str, network: &NetworkInfo) -> ClientResult<ContractAddress> {
        let address = self
            .get(&network.name, contract)
            .and_then(|r| r.contract_addresses.get(DEFAULT_INSTANCE))
            .ok_or_else(|| {
                ClientError::AddressResolution(format!(
                    "no `{contract}` deployment recorded for {network}"
                ))
            })?;
        ContractAddress::new(address.as_str())
    }
}
