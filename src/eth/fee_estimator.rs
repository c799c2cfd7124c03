use alloy_provider::utils::Eip1559Estimation;
use serde::{Deserialize, Serialize};

use crate::{
    error::WalletResult,
    eth::{
        constants::ONE_GWEI,
        rpc::{AccountChainRpc, FeeData},
    },
};

/// Fee cap rule: `max_fee = base_fee * base_fee_multiplier + priority_fee`.
/// The multiplier is headroom for base fee growth over the next blocks, not a
/// protocol rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeePolicy {
    pub base_fee_multiplier: u64,
    /// Used when the latest block carries no base fee.
    pub fallback_base_fee_wei: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        Self {
            base_fee_multiplier: 2,
            fallback_base_fee_wei: ONE_GWEI,
        }
    }
}

impl FeePolicy {
    pub fn caps(&self, fee_data: &FeeData) -> Eip1559Estimation {
        let base_fee = fee_data
            .base_fee_per_gas
            .unwrap_or(u128::from(self.fallback_base_fee_wei));
        let priority_fee = fee_data.max_priority_fee_per_gas;

        Eip1559Estimation {
            max_fee_per_gas: base_fee
                .saturating_mul(u128::from(self.base_fee_multiplier))
                .saturating_add(priority_fee),
            max_priority_fee_per_gas: priority_fee,
        }
    }
}

/// Introduction to Ethereum transaction fee related concepts
/// https://github.com/LearnWeb3DAO/What-is-Gas
#[derive(Debug, Clone, Copy, Default)]
pub struct FeeEstimator {
    policy: FeePolicy,
}

impl FeeEstimator {
    pub fn new(policy: FeePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    pub async fn estimate<R: AccountChainRpc>(&self, rpc: &R) -> WalletResult<Eip1559Estimation> {
        let fee_data = rpc.get_fee_data().await?;
        let estimation = self.policy.caps(&fee_data);
        tracing::debug!(
            "base fee {:?}, max fee {}, priority fee {}",
            fee_data.base_fee_per_gas,
            estimation.max_fee_per_gas,
            estimation.max_priority_fee_per_gas
        );
        Ok(estimation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fee_data(base: Option<u128>, priority: u128) -> FeeData {
        FeeData {
            base_fee_per_gas: base,
            max_priority_fee_per_gas: priority,
        }
    }

    #[test]
    fn test_fee_caps() {
        let policy = FeePolicy::default();
        let gwei = u128::from(ONE_GWEI);
        for (base, priority) in [(0u128, 0u128), (100, 7), (30 * gwei, 2 * gwei)] {
            let caps = policy.caps(&fee_data(Some(base), priority));
            assert_eq!(caps.max_fee_per_gas, 2 * base + priority);
            assert_eq!(caps.max_priority_fee_per_gas, priority);
        }
    }

    #[test]
    fn test_missing_base_fee_uses_floor() {
        let caps = FeePolicy::default().caps(&fee_data(None, 5));
        // Pre-London chain: 1 gwei floor
        assert_eq!(caps.max_fee_per_gas, 2 * 1_000_000_000 + 5);
        assert_eq!(caps.max_priority_fee_per_gas, 5);
    }

    #[test]
    fn test_multiplier_is_tunable() {
        let policy = FeePolicy {
            base_fee_multiplier: 3,
            ..FeePolicy::default()
        };
        let caps = policy.caps(&fee_data(Some(10), 1));
        assert_eq!(caps.max_fee_per_gas, 31);
    }

    #[test]
    fn test_caps_saturate() {
        let caps = FeePolicy::default().caps(&fee_data(Some(u128::MAX), 1));
        assert_eq!(caps.max_fee_per_gas, u128::MAX);
    }
}
