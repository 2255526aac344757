use std::collections::HashMap;
use std::time::Duration;

use distribute_core::{DistributeConfig, validate_url};
use serde::{Deserialize, Serialize};

use crate::network::{Network, NetworkInfo, default_networks};

/// Configuration for a single LCD endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfig {
    pub network: Network,
    pub url: String,
    pub is_custom: bool,
    pub timeout_secs: u64,
}

impl RpcConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Manages per-network LCD endpoint configuration with custom override support.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcConfigStore {
    configs: HashMap<Network, RpcConfig>,
}

impl RpcConfigStore {
    /// Create a store populated with the public LCD URLs of every preset.
    pub fn with_defaults() -> Self {
        let configs = default_networks()
            .into_iter()
            .map(|(network, info)| {
                let rpc = RpcConfig {
                    network,
                    url: info.lcd,
                    is_custom: false,
                    timeout_secs: DEFAULT_TIMEOUT_SECS,
                };
                (network, rpc)
            })
            .collect();

        Self { configs }
    }

    /// Defaults plus the overrides carried by the application config.
    pub fn from_config(config: &DistributeConfig) -> anyhow::Result<Self> {
        let mut store = Self::with_defaults();
        for rpc in store.configs.values_mut() {
            rpc.timeout_secs = config.request_timeout_secs;
        }
        if let Some(url) = &config.lcd_url {
            let network = Network::from_name(&config.network)
                .ok_or_else(|| anyhow::anyhow!("unknown network: {}", config.network))?;
            store.set_custom_rpc(network, url.clone())?;
        }
        Ok(store)
    }

    /// Get the LCD configuration for a network.
    pub fn get_rpc(&self, network: Network) -> Option<&RpcConfig> {
        self.configs.get(&network)
    }

    /// The LCD URL to use for whatever network a wallet reports. Known
    /// presets go through the store so custom overrides apply; anything else
    /// uses the URL the wallet advertised.
    pub fn lcd_for(&self, info: &NetworkInfo) -> String {
        info.preset()
            .and_then(|n| self.get_rpc(n))
            .map(|rpc| rpc.url.clone())
            .unwrap_or_else(|| info.lcd.clone())
    }

    /// Override the LCD URL for a network with a custom endpoint.
    ///
    /// Returns `Err` if the URL fails validation.
    pub fn set_custom_rpc(&mut self, network: Network, url: String) -> anyhow::Result<()> {
        if !validate_url(&url) {
            anyhow::bail!("invalid LCD URL: {url}");
        }

        let entry = self.configs.entry(network).or_insert_with(|| RpcConfig {
            network,
            url: String::new(),
            is_custom: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        });
        entry.url = url.trim_end_matches('/').to_string();
        entry.is_custom = true;
        Ok(())
    }

    /// Reset a network's LCD URL back to the built-in default.
    pub fn reset_to_default(&mut self, network: Network) {
        let entry = self.configs.entry(network).or_insert_with(|| RpcConfig {
            network,
            url: String::new(),
            is_custom: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        });
        entry.url = network.default_lcd_url().to_string();
        entry.is_custom = false;
    }
}

impl Default for RpcConfigStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}
