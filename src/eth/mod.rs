pub mod config;
pub mod constants;
pub mod erc20_retriver;
pub mod fee_estimator;
pub mod init;
pub mod rpc;
pub mod token;
pub mod tx_builder;
pub mod wallet;
pub mod watchlist;

pub use erc20_retriver::Erc20Retriever;
pub use init::*;
pub use rpc::{AccountChainRpc, AlloyRpc};
pub use tx_builder::TxBuilder;
pub use wallet::{AccountKey, derive_account_chain_key, parse_address};
