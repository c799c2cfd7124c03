use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    config::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, KEYSTORE_FILE_NAME, WATCHLIST_FILE_NAME},
    error::WalletResult,
    eth::config::EthereumConfig,
    keystore::KdfKind,
    xrpl::config::{LedgerConfig, LedgerNetwork},
};

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ethereum: EthereumConfig,
    pub ledger: LedgerConfig,
    pub keystore: KeystoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeystoreConfig {
    pub path: PathBuf,
    pub watchlist_path: PathBuf,
    /// KDF used when a new envelope is written. Existing envelopes keep theirs.
    pub kdf: KdfKind,
}

impl Default for KeystoreConfig {
    fn default() -> Self {
        let dir = Config::config_dir();
        Self {
            path: dir.join(KEYSTORE_FILE_NAME),
            watchlist_path: dir.join(WATCHLIST_FILE_NAME),
            kdf: KdfKind::default(),
        }
    }
}

impl Config {
    /// Loads `$HOME/.crosswallet/config.json` and applies environment overrides.
    pub fn new() -> WalletResult<Self> {
        let mut config = Self::load_from(&Self::config_dir().join(CONFIG_FILE_NAME))?;
        config.apply_env();
        Ok(config)
    }

    pub fn load_from(path: &Path) -> WalletResult<Self> {
        if !path.exists() {
            tracing::warn!(
                "Config file not found at {}, creating default config",
                path.display()
            );
            return Self::create_config(path);
        }

        let raw_config = fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw_config).unwrap_or_else(|e| {
            tracing::error!("fail to deserialize config {}: {}", path.display(), e);
            Self::default()
        });
        Ok(config)
    }

    fn create_config(path: &Path) -> WalletResult<Self> {
        let default_config = Self::default();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(&default_config)
            .map_err(|e| std::io::Error::other(format!("failed to stringify config: {e}")))?;
        fs::write(path, payload)?;
        Ok(default_config)
    }

    /// `ETH_RPC_URL` wins over `INFURA_API_KEY`; `XRPL_RPC_URL` wins over
    /// the endpoint implied by `XRPL_NETWORK`.
    pub fn apply_env(&mut self) {
        self.apply_vars(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()));
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(url) = var("ETH_RPC_URL") {
            self.ethereum.rpc_url = url;
        } else if let Some(key) = var("INFURA_API_KEY") {
            self.ethereum.rpc_url = format!("https://sepolia.infura.io/v3/{key}");
        }

        if let Some(network) = var("XRPL_NETWORK") {
            self.ledger.network = LedgerNetwork::from_name(&network);
        }
        if let Some(url) = var("XRPL_RPC_URL") {
            self.ledger.rpc_url = Some(url);
        }
    }

    pub fn config_dir() -> PathBuf {
        let home = std::env::var_os("HOME").map(PathBuf::from).unwrap_or_default();
        home.join(CONFIG_DIR_NAME)
    }
}
