use serde::{Deserialize, Serialize};

use crate::eth::fee_estimator::FeePolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EthereumConfig {
    pub rpc_url: String,
    pub fee_policy: FeePolicy,
}

impl EthereumConfig {
    pub fn new() -> Self {
        Self {
            rpc_url: "https://ethereum-sepolia-rpc.publicnode.com".to_string(),
            fee_policy: FeePolicy::default(),
        }
    }
}

impl Default for EthereumConfig {
    fn default() -> Self {
        Self::new()
    }
}
