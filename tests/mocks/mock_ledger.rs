use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    },
};

use crosswallet::{
    error::WalletResult,
    xrpl::{
        LedgerRpc,
        payment::Payment,
        rpc::{SubmitAck, TxStatus},
    },
};

pub const FEE_DROPS: u64 = 12;

/// In-memory ledger node. Lookups replay the scripted statuses, then report
/// `Pending` forever.
pub struct MockLedger {
    pub sequence: AtomicU32,
    pub engine_result: Mutex<String>,
    pub statuses: Mutex<VecDeque<TxStatus>>,
    pub submitted: Mutex<Vec<String>>,
    pub lookups: AtomicU32,
}

impl MockLedger {
    pub fn new(statuses: Vec<TxStatus>) -> Self {
        Self {
            sequence: AtomicU32::new(1),
            engine_result: Mutex::new("tesSUCCESS".into()),
            statuses: Mutex::new(statuses.into()),
            submitted: Mutex::new(Vec::new()),
            lookups: AtomicU32::new(0),
        }
    }

    pub fn validating_on(poll: usize) -> Self {
        let mut statuses = vec![TxStatus::NotFound; poll.saturating_sub(1)];
        statuses.push(TxStatus::Validated {
            result: Some("tesSUCCESS".into()),
        });
        Self::new(statuses)
    }

    pub fn never_validating() -> Self {
        Self::new(Vec::new())
    }

    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl LedgerRpc for MockLedger {
    async fn autofill(&self, mut payment: Payment) -> WalletResult<Payment> {
        if payment.sequence.is_none() {
            payment.sequence = Some(self.sequence.fetch_add(1, Ordering::SeqCst));
        }
        payment.fee_drops.get_or_insert(FEE_DROPS);
        payment.last_ledger_sequence.get_or_insert(1_000);
        Ok(payment)
    }

    async fn submit(&self, tx_blob: &str) -> WalletResult<SubmitAck> {
        self.submitted.lock().unwrap().push(tx_blob.to_string());
        Ok(SubmitAck {
            engine_result: self.engine_result.lock().unwrap().clone(),
            engine_result_message: "scripted".into(),
        })
    }

    async fn get_tx(&self, _hash: &str) -> WalletResult<TxStatus> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(TxStatus::Pending))
    }

    async fn account_balance(&self, _address: &str) -> WalletResult<Option<u64>> {
        Ok(None)
    }
}
