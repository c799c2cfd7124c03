use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    config::Chain,
    error::{WalletError, WalletResult},
    eth::{constants::ETHER_DECIMALS, parse_address, token::to_base_units},
    xrpl::{address::decode_classic, tx_builder::xrp_to_drops},
};

/// A send as the user typed it: amount in whole units of the chain's currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub chain: Chain,
    pub destination: String,
    pub amount: String,
    #[serde(default)]
    pub destination_tag: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedTransfer {
    Ethereum {
        to: Address,
        value: U256,
    },
    Xrpl {
        destination: String,
        drops: u64,
        destination_tag: Option<u32>,
    },
}

impl TransferRequest {
    pub fn new(chain: Chain, destination: &str, amount: &str) -> Self {
        Self {
            chain,
            destination: destination.trim().to_string(),
            amount: amount.trim().to_string(),
            destination_tag: None,
        }
    }

    /// Positive amount and a destination that parses for the selected chain.
    /// Runs before any key or network access.
    pub fn validate(&self) -> WalletResult<ValidatedTransfer> {
        match self.chain {
            Chain::Ethereum => {
                if self.destination_tag.is_some() {
                    return Err(WalletError::InvalidInput(
                        "destination tags only exist on the ledger chain".into(),
                    ));
                }
                let to = parse_address(&self.destination)?;
                let value = to_base_units(&self.amount, ETHER_DECIMALS)?;
                if value.is_zero() {
                    return Err(WalletError::InvalidInput(format!(
                        "amount must be positive, got {}",
                        self.amount
                    )));
                }
                Ok(ValidatedTransfer::Ethereum { to, value })
            }
            Chain::Xrpl => {
                decode_classic(&self.destination)?;
                Ok(ValidatedTransfer::Xrpl {
                    destination: self.destination.trim().to_string(),
                    drops: xrp_to_drops(&self.amount)?,
                    destination_tag: self.destination_tag,
                })
            }
        }
    }
}
