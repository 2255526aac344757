use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Networks the dApp ships defaults for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
    Localterra,
}

impl Network {
    pub const ALL: [Network; 3] = [Network::Mainnet, Network::Testnet, Network::Localterra];

    /// Name used by the wallet provider and as the key in `refs.terrain.json`.
    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Testnet => "testnet",
            Network::Localterra => "localterra",
        }
    }

    /// Cosmos chain ID.
    pub fn chain_id(&self) -> &'static str {
        match self {
            Network::Mainnet => "phoenix-1",
            Network::Testnet => "pisco-1",
            Network::Localterra => "localterra",
        }
    }

    /// Public LCD endpoint.
    pub fn default_lcd_url(&self) -> &'static str {
        match self {
            Network::Mainnet => "https://phoenix-lcd.terra.dev",
            Network::Testnet => "https://pisco-lcd.terra.dev",
            Network::Localterra => "http://localhost:1317",
        }
    }

    /// Look a preset up by its network name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|n| n.name() == name)
    }

    /// Full description of this preset.
    pub fn info(&self) -> NetworkInfo {
        NetworkInfo {
            name: self.name().into(),
            chain_id: self.chain_id().into(),
            lcd: self.default_lcd_url().into(),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The network a wallet session reports it is attached to.
///
/// Two infos are the same network identity when name and chain ID agree; the
/// LCD URL may differ between providers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInfo {
    pub name: String,
    pub chain_id: String,
    pub lcd: String,
}

impl NetworkInfo {
    pub fn same_identity(&self, other: &NetworkInfo) -> bool {
        self.name == other.name && self.chain_id == other.chain_id
    }

    /// The matching preset, if the provider is on a known network.
    pub fn preset(&self) -> Option<Network> {
        Network::from_name(&self.name).filter(|n| n.chain_id() == self.chain_id)
    }
}

impl fmt::Display for NetworkInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.chain_id)
    }
}

/// Default infos for every preset, keyed by network.
pub fn default_networks() -> HashMap<Network, NetworkInfo> {
    Network::ALL.into_iter().map(|n| (n, n.info())).collect()
}
