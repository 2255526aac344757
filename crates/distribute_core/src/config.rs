use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Application configuration stored at `~/.distribute/config.json`.
///
/// Only non-secret settings live here. Wallet keys never touch this file; the
/// wallet provider owns them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DistributeConfig {
    // Network
    pub network: String,
    pub lcd_url: Option<String>,
    pub request_timeout_secs: u64,

    // Contract
    pub contract_name: String,
    pub refs_path: Option<String>,

    // General
    pub log_level: String,
}

impl Default for DistributeConfig {
    fn default() -> Self {
        Self {
            network: "testnet".into(),
            lcd_url: None,
            request_timeout_secs: 30,
            contract_name: "distribute".into(),
            refs_path: None,
            log_level: "info".into(),
        }
    }
}

impl DistributeConfig {
    /// Returns the base config directory: `~/.distribute/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".distribute"))
    }

    /// Returns the config file path: `~/.distribute/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.distribute/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Ensures all required directories exist.
    pub fn ensure_dirs() -> Result<()> {
        let dirs = [Self::base_dir()?, Self::logs_dir()?];
        for dir in &dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Loads config from disk, or creates default if missing.
    pub fn load() -> Result<Self> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        Self::load_from_path(&path)
    }

    /// Load config from a specific file path. A missing file is replaced by a
    /// freshly written default.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            let config: Self = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            config.validate()?;
            info!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to_path(path)?;
            info!("Created default config at {}", path.display());
            Ok(config)
        }
    }

    /// Saves config to `~/.distribute/config.json`.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to_path(&path)
    }

    /// Save config to a specific file path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }

    /// Reject values that would make every later call fail.
    pub fn validate(&self) -> Result<()> {
        if self.network.trim().is_empty() {
            anyhow::bail!("network cannot be empty");
        }
        if self.contract_name.trim().is_empty() {
            anyhow::bail!("contract_name cannot be empty");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than 0");
        }
        if let Some(url) = &self.lcd_url {
            if !validate_url(url) {
                anyhow::bail!("invalid LCD URL: {url}");
            }
        }
        Ok(())
    }

    /// LCD request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolved refs file path, falling back to `./refs.terrain.json`.
    pub fn refs_file(&self) -> PathBuf {
        self.refs_path
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("refs.terrain.json"))
    }
}

/// Validate that a URL is well-formed and uses HTTP or HTTPS.
pub fn validate_url(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let scheme = parsed.scheme();
            (scheme == "http" || scheme == "https") && parsed.host().is_some()
        }
        Err(_) => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
