use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{WalletError, WalletResult};

pub const CONFIG_DIR_NAME: &str = ".crosswallet";
pub const CONFIG_FILE_NAME: &str = "config.json";
pub const KEYSTORE_FILE_NAME: &str = "keystore.json";
pub const WATCHLIST_FILE_NAME: &str = "tokens_watchlist.json";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Chain {
    Ethereum = 0,
    Xrpl = 1,
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Chain::Ethereum => f.write_str("ethereum"),
            Chain::Xrpl => f.write_str("xrpl"),
        }
    }
}

impl TryFrom<i32> for Chain {
    type Error = WalletError;

    fn try_from(value: i32) -> WalletResult<Self> {
        match value {
            0 => Ok(Chain::Ethereum),
            1 => Ok(Chain::Xrpl),
            _ => Err(WalletError::InvalidInput(format!(
                "unknown chain selector {value}"
            ))),
        }
    }
}

impl From<Chain> for i32 {
    fn from(chain: Chain) -> Self {
        chain as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_selector_round_trip() {
        assert_eq!(Chain::try_from(i32::from(Chain::Xrpl)).unwrap(), Chain::Xrpl);
        assert!(matches!(
            Chain::try_from(7),
            Err(WalletError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_chain_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Chain::Ethereum).unwrap(), "\"ethereum\"");
    }
}
