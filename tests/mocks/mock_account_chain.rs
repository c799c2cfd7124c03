use std::sync::{
    Mutex,
    atomic::{AtomicU64, Ordering},
};

use alloy::{
    consensus::TxEnvelope,
    eips::eip2718::Decodable2718,
    primitives::{Address, Bytes, TxHash, U256, keccak256},
    rpc::types::TransactionRequest,
};

use crosswallet::{
    error::{WalletError, WalletResult},
    eth::{AccountChainRpc, rpc::FeeData},
};

pub const CHAIN_ID: u64 = 11_155_111;

/// In-memory account chain node. Every accepted transaction bumps the nonce.
pub struct MockAccountChain {
    pub nonce: AtomicU64,
    pub fee_data: Mutex<FeeData>,
    pub reject_with: Mutex<Option<String>>,
    pub sent: Mutex<Vec<TxEnvelope>>,
}

impl MockAccountChain {
    pub fn new(base_fee: u128, tip: u128) -> Self {
        Self {
            nonce: AtomicU64::new(0),
            fee_data: Mutex::new(FeeData {
                base_fee_per_gas: Some(base_fee),
                max_priority_fee_per_gas: tip,
            }),
            reject_with: Mutex::new(None),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<TxEnvelope> {
        self.sent.lock().unwrap().clone()
    }
}

impl AccountChainRpc for MockAccountChain {
    async fn chain_id(&self) -> WalletResult<u64> {
        Ok(CHAIN_ID)
    }

    async fn get_nonce(&self, _address: Address) -> WalletResult<u64> {
        Ok(self.nonce.load(Ordering::SeqCst))
    }

    async fn get_balance(&self, _address: Address) -> WalletResult<U256> {
        Ok(U256::from(10u64).pow(U256::from(18)))
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> WalletResult<u64> {
        Ok(55_000)
    }

    async fn get_fee_data(&self) -> WalletResult<FeeData> {
        Ok(*self.fee_data.lock().unwrap())
    }

    async fn call(&self, _tx: &TransactionRequest) -> WalletResult<Bytes> {
        Ok(Bytes::new())
    }

    async fn send_raw(&self, raw: &[u8]) -> WalletResult<TxHash> {
        if let Some(message) = self.reject_with.lock().unwrap().clone() {
            return Err(WalletError::TransactionRejected(message));
        }
        let mut buf = raw;
        let envelope = TxEnvelope::decode_2718(&mut buf)
            .map_err(|e| WalletError::InvalidInput(e.to_string()))?;
        self.sent.lock().unwrap().push(envelope);
        self.nonce.fetch_add(1, Ordering::SeqCst);
        Ok(keccak256(raw))
    }
}
