use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerNetwork {
    #[default]
    Testnet,
    Devnet,
    Mainnet,
}

impl LedgerNetwork {
    /// Unknown names fall back to testnet.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "mainnet" => LedgerNetwork::Mainnet,
            "devnet" => LedgerNetwork::Devnet,
            "testnet" => LedgerNetwork::Testnet,
            other => {
                tracing::warn!("unknown ledger network {other:?}, using testnet");
                LedgerNetwork::Testnet
            }
        }
    }

    pub const fn default_rpc_url(self) -> &'static str {
        match self {
            LedgerNetwork::Testnet => "https://s.altnet.rippletest.net:51234",
            LedgerNetwork::Devnet => "https://s.devnet.rippletest.net:51234",
            LedgerNetwork::Mainnet => "https://xrplcluster.com",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub network: LedgerNetwork,
    /// Overrides the network's public endpoint.
    pub rpc_url: Option<String>,
    pub poll_interval_ms: u64,
    pub poll_attempts: u32,
    pub last_ledger_offset: u32,
    pub max_fee_drops: u64,
}

impl LedgerConfig {
    pub fn rpc_url(&self) -> &str {
        self.rpc_url
            .as_deref()
            .unwrap_or_else(|| self.network.default_rpc_url())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            network: LedgerNetwork::Testnet,
            rpc_url: None,
            poll_interval_ms: 2000,
            poll_attempts: 10,
            last_ledger_offset: 20,
            // 2 XRP
            max_fee_drops: 2_000_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_names() {
        assert_eq!(LedgerNetwork::from_name("Devnet"), LedgerNetwork::Devnet);
        assert_eq!(LedgerNetwork::from_name(" mainnet "), LedgerNetwork::Mainnet);
        assert_eq!(LedgerNetwork::from_name("betanet"), LedgerNetwork::Testnet);
    }

    #[test]
    fn test_rpc_url_override() {
        let mut config = LedgerConfig::default();
        assert_eq!(config.rpc_url(), "https://s.altnet.rippletest.net:51234");
        config.rpc_url = Some("http://localhost:5005".into());
        assert_eq!(config.rpc_url(), "http://localhost:5005");
    }
}
