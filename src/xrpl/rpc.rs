use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::{
    error::{WalletError, WalletResult},
    xrpl::{config::LedgerConfig, payment::Payment},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Engine result of a `submit` call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmitAck {
    pub engine_result: String,
    #[serde(default)]
    pub engine_result_message: String,
}

impl SubmitAck {
    /// `tem` malformed, `tef` failed, `tel` local: never applied to a ledger.
    pub fn is_rejected(&self) -> bool {
        ["tem", "tef", "tel"]
            .iter()
            .any(|class| self.engine_result.starts_with(class))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxStatus {
    Validated { result: Option<String> },
    Pending,
    NotFound,
}

/// Narrow view of a ledger node used by the payment pipeline.
/// Futures are `Send` so builders can run on spawned tasks.
pub trait LedgerRpc {
    /// Fills Sequence, Fee and LastLedgerSequence where unset.
    fn autofill(&self, payment: Payment) -> impl Future<Output = WalletResult<Payment>> + Send;

    /// A node error reply is `TransactionRejected`, like a `tem`/`tef`/`tel` result.
    fn submit(&self, tx_blob: &str) -> impl Future<Output = WalletResult<SubmitAck>> + Send;

    fn get_tx(&self, hash: &str) -> impl Future<Output = WalletResult<TxStatus>> + Send;

    /// Validated balance in drops, `None` for an unfunded account.
    fn account_balance(
        &self,
        address: &str,
    ) -> impl Future<Output = WalletResult<Option<u64>>> + Send;
}

pub struct JsonRpcClient {
    http: Client,
    url: String,
    last_ledger_offset: u32,
    max_fee_drops: u64,
}

impl std::fmt::Debug for JsonRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonRpcClient")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

/// `status: error` payload of a rippled response.
#[derive(Debug)]
struct NodeError {
    code: String,
    message: String,
}

impl JsonRpcClient {
    pub fn new(config: &LedgerConfig) -> WalletResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WalletError::network("failed to build ledger http client", e))?;
        Ok(Self {
            http,
            url: config.rpc_url().to_string(),
            last_ledger_offset: config.last_ledger_offset,
            max_fee_drops: config.max_fee_drops,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request(&self, method: &str, params: Value) -> WalletResult<Result<Value, NodeError>> {
        debug!("ledger rpc {method}");
        let body = json!({ "method": method, "params": [params] });
        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| WalletError::network(method, e))?;
        let mut payload: Value = response
            .json()
            .await
            .map_err(|e| WalletError::network(method, e))?;

        let result = payload
            .get_mut("result")
            .map(Value::take)
            .ok_or_else(|| WalletError::Network(format!("{method}: response has no result")))?;
        if result["status"] == "error" {
            return Ok(Err(NodeError {
                code: result["error"].as_str().unwrap_or("unknown").to_string(),
                message: result["error_message"]
                    .as_str()
                    .or_else(|| result["error_exception"].as_str())
                    .unwrap_or_default()
                    .to_string(),
            }));
        }
        Ok(Ok(result))
    }

    /// Like `request` but a node error is a failure.
    async fn call(&self, method: &str, params: Value) -> WalletResult<Value> {
        self.request(method, params).await?.map_err(|e| {
            WalletError::Network(format!("{method}: {} {}", e.code, e.message))
        })
    }

    async fn account_sequence(&self, address: &str) -> WalletResult<u32> {
        let result = self
            .call(
                "account_info",
                json!({ "account": address, "ledger_index": "current" }),
            )
            .await?;
        field_u64(&result["account_data"]["Sequence"], "account_info Sequence")?
            .try_into()
            .map_err(|_| WalletError::Network("account_info Sequence out of range".into()))
    }

    async fn open_ledger_fee(&self) -> WalletResult<u64> {
        let result = self.call("fee", json!({})).await?;
        let fee = field_u64(&result["drops"]["open_ledger_fee"], "fee open_ledger_fee")?;
        Ok(fee.min(self.max_fee_drops))
    }

    async fn current_ledger_index(&self) -> WalletResult<u32> {
        let result = self.call("ledger_current", json!({})).await?;
        field_u64(&result["ledger_current_index"], "ledger_current_index")?
            .try_into()
            .map_err(|_| WalletError::Network("ledger_current_index out of range".into()))
    }
}

impl LedgerRpc for JsonRpcClient {
    async fn autofill(&self, mut payment: Payment) -> WalletResult<Payment> {
        if payment.sequence.is_none() {
            payment.sequence = Some(self.account_sequence(&payment.account).await?);
        }
        if payment.fee_drops.is_none() {
            payment.fee_drops = Some(self.open_ledger_fee().await?);
        }
        if payment.last_ledger_sequence.is_none() {
            let current = self.current_ledger_index().await?;
            payment.last_ledger_sequence = Some(current.saturating_add(self.last_ledger_offset));
        }
        Ok(payment)
    }

    async fn submit(&self, tx_blob: &str) -> WalletResult<SubmitAck> {
        let result = self
            .request("submit", json!({ "tx_blob": tx_blob }))
            .await?
            .map_err(|e| WalletError::TransactionRejected(format!("{}: {}", e.code, e.message)))?;
        serde_json::from_value(result)
            .map_err(|e| WalletError::network("submit returned an unexpected body", e))
    }

    async fn get_tx(&self, hash: &str) -> WalletResult<TxStatus> {
        let result = match self
            .request("tx", json!({ "transaction": hash, "binary": false }))
            .await?
        {
            Ok(result) => result,
            Err(e) if e.code == "txnNotFound" => return Ok(TxStatus::NotFound),
            Err(e) => return Err(WalletError::Network(format!("tx: {} {}", e.code, e.message))),
        };

        if result["validated"].as_bool().unwrap_or(false) {
            let outcome = result["meta"]["TransactionResult"]
                .as_str()
                .map(str::to_string);
            return Ok(TxStatus::Validated { result: outcome });
        }
        Ok(TxStatus::Pending)
    }

    async fn account_balance(&self, address: &str) -> WalletResult<Option<u64>> {
        let result = match self
            .request(
                "account_info",
                json!({ "account": address, "ledger_index": "validated" }),
            )
            .await?
        {
            Ok(result) => result,
            Err(e) if e.code == "actNotFound" => return Ok(None),
            Err(e) => {
                return Err(WalletError::Network(format!(
                    "account_info: {} {}",
                    e.code, e.message
                )));
            }
        };
        field_u64(&result["account_data"]["Balance"], "account_info Balance").map(Some)
    }
}

/// rippled sends some integers as numbers and others as strings.
fn field_u64(value: &Value, name: &str) -> WalletResult<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| WalletError::Network(format!("{name} missing or malformed")))
}
