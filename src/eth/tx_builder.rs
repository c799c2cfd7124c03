use alloy::{
    consensus::{SignableTransaction, TxEip1559, TxEnvelope},
    eips::eip2718::Encodable2718,
    network::{TransactionBuilder, TxSignerSync},
    primitives::{Address, Bytes, TxHash, TxKind, U256},
    rpc::types::TransactionRequest,
    sol_types::SolCall,
};
use alloy_provider::utils::Eip1559Estimation;
use tracing::{debug, info};

use crate::{
    chain_trait::SecureKey,
    error::{Stage, WalletError, WalletResult},
    eth::{
        constants::{ETHER_DECIMALS, NATIVE_TRANSFER_GAS},
        erc20_retriver::IERC20,
        fee_estimator::FeeEstimator,
        rpc::AccountChainRpc,
        token::to_base_units,
        wallet::AccountKey,
    },
};

/// What the transaction does once mined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Native { to: Address, value: U256 },
    Contract { to: Address, data: Bytes },
}

impl Payload {
    fn to(&self) -> Address {
        match self {
            Payload::Native { to, .. } | Payload::Contract { to, .. } => *to,
        }
    }
}

/// Unsigned type-2 transaction with everything the network dictated.
#[derive(Debug, Clone)]
pub struct PreparedTx {
    pub tx: TxEip1559,
    pub fees: Eip1559Estimation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub hash: TxHash,
    pub raw: Bytes,
}

/// Build, estimate, sign, broadcast. Nothing is retried or kept between calls.
#[derive(Debug, Clone)]
pub struct TxBuilder<R: AccountChainRpc> {
    rpc: R,
    fee_estimator: FeeEstimator,
}

impl<R: AccountChainRpc> TxBuilder<R> {
    pub fn new(rpc: R, fee_estimator: FeeEstimator) -> Self {
        Self { rpc, fee_estimator }
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn fee_estimator(&self) -> &FeeEstimator {
        &self.fee_estimator
    }

    /// Fetches chain id, a fresh nonce, fee caps and (for contract calls) a
    /// simulated gas limit.
    pub async fn build(&self, sender: Address, payload: Payload) -> WalletResult<PreparedTx> {
        let chain_id = self
            .rpc
            .chain_id()
            .await
            .map_err(WalletError::failed_at(Stage::ChainId))?;
        let nonce = self
            .rpc
            .get_nonce(sender)
            .await
            .map_err(WalletError::failed_at(Stage::Nonce))?;
        let fees = self
            .fee_estimator
            .estimate(&self.rpc)
            .await
            .map_err(WalletError::failed_at(Stage::FeeData))?;

        let (value, input) = match &payload {
            Payload::Native { value, .. } => (*value, Bytes::new()),
            Payload::Contract { data, .. } => (U256::ZERO, data.clone()),
        };
        let gas_limit = match &payload {
            Payload::Native { .. } => NATIVE_TRANSFER_GAS,
            Payload::Contract { to, data } => {
                let request = TransactionRequest::default()
                    .with_from(sender)
                    .with_to(*to)
                    .with_input(data.clone())
                    .with_chain_id(chain_id)
                    .with_nonce(nonce);
                self.rpc
                    .estimate_gas(&request)
                    .await
                    .map_err(WalletError::failed_at(Stage::GasEstimation))?
            }
        };
        debug!("built tx chain_id={chain_id} nonce={nonce} gas_limit={gas_limit}");

        Ok(PreparedTx {
            tx: TxEip1559 {
                chain_id,
                nonce,
                gas_limit,
                max_fee_per_gas: fees.max_fee_per_gas,
                max_priority_fee_per_gas: fees.max_priority_fee_per_gas,
                to: TxKind::Call(payload.to()),
                value,
                access_list: Default::default(),
                input,
            },
            fees,
        })
    }

    /// Offline. Deterministic (RFC 6979) signature.
    pub fn sign(prepared: PreparedTx, key: &AccountKey) -> WalletResult<SignedTx> {
        let mut tx = prepared.tx;
        let signature = key
            .expose()
            .sign_transaction_sync(&mut tx)
            .map_err(|e| WalletError::Crypto(format!("Failed to sign transaction: {e}")))
            .map_err(WalletError::failed_at(Stage::Signing))?;

        let envelope = TxEnvelope::Eip1559(tx.into_signed(signature));
        Ok(SignedTx {
            hash: *envelope.tx_hash(),
            raw: envelope.encoded_2718().into(),
        })
    }

    /// Returns as soon as the node accepts the transaction; confirmation is
    /// left to the caller.
    pub async fn broadcast(&self, signed: &SignedTx) -> WalletResult<TxHash> {
        let hash = match self.rpc.send_raw(&signed.raw).await {
            Ok(hash) => hash,
            Err(rejected @ WalletError::TransactionRejected(_)) => return Err(rejected),
            Err(e) => return Err(WalletError::failed_at(Stage::Broadcast)(e)),
        };
        if hash != signed.hash {
            tracing::warn!("node reported hash {hash}, computed {}", signed.hash);
        }
        Ok(signed.hash)
    }

    pub async fn send(&self, key: &AccountKey, payload: Payload) -> WalletResult<TxHash> {
        let prepared = self.build(key.address(), payload).await?;
        let signed = Self::sign(prepared, key)?;
        let hash = self.broadcast(&signed).await?;
        info!("Sent transaction {hash} from {}", key.checksum_address());
        Ok(hash)
    }

    /// `amount` is in ether, e.g. "0.01".
    pub async fn send_native(
        &self,
        key: &AccountKey,
        to: Address,
        amount: &str,
    ) -> WalletResult<TxHash> {
        let value = to_base_units(amount, ETHER_DECIMALS)?;
        self.send_wei(key, to, value).await
    }

    pub async fn send_wei(
        &self,
        key: &AccountKey,
        to: Address,
        value: U256,
    ) -> WalletResult<TxHash> {
        if value.is_zero() {
            return Err(WalletError::InvalidInput("amount must be positive".into()));
        }
        self.send(key, Payload::Native { to, value }).await
    }

    /// `amount` is in the token's base units.
    pub async fn transfer_token(
        &self,
        key: &AccountKey,
        token: Address,
        to: Address,
        amount: U256,
    ) -> WalletResult<TxHash> {
        if amount.is_zero() {
            return Err(WalletError::InvalidInput("amount must be positive".into()));
        }
        let data = IERC20::transferCall { to, amount }.abi_encode();
        self.send(key, Payload::Contract { to: token, data: data.into() })
            .await
    }

    /// A zero `amount` revokes the allowance.
    pub async fn approve_token(
        &self,
        key: &AccountKey,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> WalletResult<TxHash> {
        let data = IERC20::approveCall { spender, amount }.abi_encode();
        self.send(key, Payload::Contract { to: token, data: data.into() })
            .await
    }
}
