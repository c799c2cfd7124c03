use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, Bytes, TxHash, U256},
    providers::Provider,
    rpc::types::TransactionRequest,
    transports::{RpcError, TransportErrorKind},
};
use alloy_provider::DynProvider;

use crate::error::{WalletError, WalletResult};

/// Fee market inputs read from the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeData {
    /// `None` when the latest block predates the fee market.
    pub base_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: u128,
}

/// Narrow view of an account chain node used by the signing pipeline.
/// Futures are `Send` so builders can run on spawned tasks.
pub trait AccountChainRpc {
    fn chain_id(&self) -> impl Future<Output = WalletResult<u64>> + Send;

    /// Next unused nonce of `address`. Never cached.
    fn get_nonce(&self, address: Address) -> impl Future<Output = WalletResult<u64>> + Send;

    fn get_balance(&self, address: Address) -> impl Future<Output = WalletResult<U256>> + Send;

    fn estimate_gas(
        &self,
        tx: &TransactionRequest,
    ) -> impl Future<Output = WalletResult<u64>> + Send;

    fn get_fee_data(&self) -> impl Future<Output = WalletResult<FeeData>> + Send;

    /// Read-only `eth_call`.
    fn call(&self, tx: &TransactionRequest) -> impl Future<Output = WalletResult<Bytes>> + Send;

    fn send_raw(&self, raw: &[u8]) -> impl Future<Output = WalletResult<TxHash>> + Send;
}

#[derive(Debug, Clone)]
pub struct AlloyRpc {
    provider: DynProvider,
}

impl AlloyRpc {
    pub fn new(provider: DynProvider) -> Self {
        Self { provider }
    }
}

impl AccountChainRpc for AlloyRpc {
    async fn chain_id(&self) -> WalletResult<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| WalletError::network("Failed to get chain id", e))
    }

    async fn get_nonce(&self, address: Address) -> WalletResult<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| WalletError::network("Failed to get transaction count", e))
    }

    async fn get_balance(&self, address: Address) -> WalletResult<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| WalletError::network("Failed to get balance", e))
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> WalletResult<u64> {
        self.provider
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| WalletError::network("Failed to estimate gas", e))
    }

    async fn get_fee_data(&self) -> WalletResult<FeeData> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await
            .map_err(|e| WalletError::network("Failed to get latest block", e))?;
        let max_priority_fee_per_gas = self
            .provider
            .get_max_priority_fee_per_gas()
            .await
            .map_err(|e| WalletError::network("Failed to get priority fee", e))?;

        Ok(FeeData {
            base_fee_per_gas: block
                .and_then(|b| b.header.base_fee_per_gas)
                .map(u128::from),
            max_priority_fee_per_gas,
        })
    }

    async fn call(&self, tx: &TransactionRequest) -> WalletResult<Bytes> {
        self.provider
            .call(tx.clone())
            .await
            .map_err(|e| WalletError::network("Failed to execute call", e))
    }

    async fn send_raw(&self, raw: &[u8]) -> WalletResult<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(raw)
            .await
            .map_err(classify_send_error)?;
        Ok(*pending.tx_hash())
    }
}

/// A JSON-RPC error object means the node refused the transaction; anything
/// else never reached it.
fn classify_send_error(err: RpcError<TransportErrorKind>) -> WalletError {
    match err.as_error_resp() {
        Some(payload) => WalletError::TransactionRejected(payload.message.to_string()),
        None => WalletError::network("Failed to send transaction", err),
    }
}
