use std::{str::FromStr, time::Duration};

use bigdecimal::{BigDecimal, ToPrimitive, num_bigint::Sign};
use tracing::{debug, info, warn};

use crate::{
    error::{WalletError, WalletResult},
    eth::token::scale_to_integer,
    xrpl::{
        address::decode_classic,
        binary::MAX_DROPS,
        config::LedgerConfig,
        payment::{Payment, SignedPayment},
        rpc::{LedgerRpc, TxStatus},
        wallet::LedgerKey,
    },
};

pub const DROPS_PER_XRP: u64 = 1_000_000;
const XRP_DECIMALS: u8 = 6;
pub const HASH_UNAVAILABLE: &str = "(hash unavailable)";

/// Most decimal digits of a drops amount, `MAX_DROPS` is 10^17.
const MAX_DROPS_DIGITS: u64 = 18;

/// Converts a decimal XRP amount to drops, truncating below one drop.
pub fn xrp_to_drops(amount: &str) -> WalletResult<u64> {
    let value = BigDecimal::from_str(amount.trim())
        .map_err(|e| WalletError::InvalidInput(format!("invalid amount {amount:?}: {e}")))?;
    if value.sign() != Sign::Plus {
        return Err(WalletError::InvalidInput(format!(
            "amount must be positive, got {amount}"
        )));
    }

    let too_large = || WalletError::InvalidInput(format!("amount {amount} is too large"));
    let drops = scale_to_integer(&value, XRP_DECIMALS, MAX_DROPS_DIGITS)
        .ok_or_else(too_large)?
        .to_u64()
        .filter(|d| *d <= MAX_DROPS)
        .ok_or_else(too_large)?;
    if drops == 0 {
        return Err(WalletError::InvalidInput(format!(
            "amount {amount} is below one drop"
        )));
    }
    Ok(drops)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub attempts: u32,
}

impl PollPolicy {
    pub fn from_config(config: &LedgerConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            attempts: config.poll_attempts,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&LedgerConfig::default())
    }
}

/// Outcome of a submitted payment. Only `Validated` is final; `Pending`
/// means the poll budget ran out and the payment may still validate later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerReceipt {
    Validated { hash: String, result: Option<String> },
    Pending { hash: String },
    HashUnavailable,
}

impl LedgerReceipt {
    pub fn hash(&self) -> &str {
        match self {
            LedgerReceipt::Validated { hash, .. } | LedgerReceipt::Pending { hash } => hash,
            LedgerReceipt::HashUnavailable => HASH_UNAVAILABLE,
        }
    }

    pub fn is_validated(&self) -> bool {
        matches!(self, LedgerReceipt::Validated { .. })
    }
}

pub struct TxBuilder<R: LedgerRpc> {
    rpc: R,
    poll: PollPolicy,
}

impl<R: LedgerRpc> TxBuilder<R> {
    pub fn new(rpc: R, poll: PollPolicy) -> Self {
        Self { rpc, poll }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    /// Build, autofill and sign a payment without submitting it.
    pub async fn prepare_payment(
        &self,
        key: &LedgerKey,
        destination: &str,
        amount_drops: u64,
        destination_tag: Option<u32>,
    ) -> WalletResult<SignedPayment> {
        decode_classic(destination)?;
        if amount_drops == 0 {
            return Err(WalletError::InvalidInput("amount must be positive".into()));
        }

        let payment = Payment::new(
            key.classic_address().to_string(),
            destination.trim().to_string(),
            amount_drops,
        )
        .with_destination_tag(destination_tag);

        let payment = self.rpc.autofill(payment).await?;
        debug!(
            "autofilled payment sequence={:?} fee={:?} last_ledger={:?}",
            payment.sequence, payment.fee_drops, payment.last_ledger_sequence
        );
        payment.sign(key)
    }

    pub async fn send_xrp(
        &self,
        key: &LedgerKey,
        destination: &str,
        amount: &str,
        destination_tag: Option<u32>,
    ) -> WalletResult<LedgerReceipt> {
        let drops = xrp_to_drops(amount)?;
        self.send_drops(key, destination, drops, destination_tag).await
    }

    pub async fn send_drops(
        &self,
        key: &LedgerKey,
        destination: &str,
        amount_drops: u64,
        destination_tag: Option<u32>,
    ) -> WalletResult<LedgerReceipt> {
        let signed = self
            .prepare_payment(key, destination, amount_drops, destination_tag)
            .await?;
        info!(
            "Sending {amount_drops} drops from {} to {destination}",
            key.classic_address()
        );
        self.submit_and_wait(&signed).await
    }

    /// Submits the blob, then polls by hash until validated or the attempt
    /// budget is spent. Running out of attempts is not an error.
    pub async fn submit_and_wait(&self, signed: &SignedPayment) -> WalletResult<LedgerReceipt> {
        let ack = self.rpc.submit(&signed.tx_blob).await?;
        if ack.is_rejected() {
            return Err(WalletError::TransactionRejected(format!(
                "{}: {}",
                ack.engine_result, ack.engine_result_message
            )));
        }
        debug!("submit accepted with {}", ack.engine_result);

        let Some(hash) = signed.hash.clone() else {
            warn!("signed payment carries no hash, skipping validation poll");
            return Ok(LedgerReceipt::HashUnavailable);
        };
        Ok(self.poll_until_validated(hash).await)
    }

    async fn poll_until_validated(&self, hash: String) -> LedgerReceipt {
        for attempt in 1..=self.poll.attempts {
            match self.rpc.get_tx(&hash).await {
                Ok(TxStatus::Validated { result }) => {
                    info!("Payment {hash} validated after {attempt} poll(s)");
                    return LedgerReceipt::Validated { hash, result };
                }
                Ok(status) => debug!("poll {attempt}: {hash} is {status:?}"),
                Err(e) => debug!("poll {attempt}: lookup of {hash} failed: {e}"),
            }
            if attempt < self.poll.attempts {
                tokio::time::sleep(self.poll.interval).await;
            }
        }
        warn!(
            "Payment {hash} not validated after {} poll(s)",
            self.poll.attempts
        );
        LedgerReceipt::Pending { hash }
    }
}
