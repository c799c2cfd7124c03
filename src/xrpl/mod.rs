pub mod address;
pub mod binary;
pub mod config;
pub mod keypair;
pub mod payment;
pub mod rpc;
pub mod tx_builder;
pub mod wallet;

pub use rpc::{JsonRpcClient, LedgerRpc};
pub use tx_builder::{LedgerReceipt, PollPolicy, TxBuilder};
pub use wallet::{LedgerKey, derive_ledger_chain_key};

/// Ledger chain client and builder wired from config.
pub fn new_tx_builder(
    config: &config::LedgerConfig,
) -> crate::error::WalletResult<TxBuilder<JsonRpcClient>> {
    Ok(TxBuilder::new(
        JsonRpcClient::new(config)?,
        PollPolicy::from_config(config),
    ))
}
