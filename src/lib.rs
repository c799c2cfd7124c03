pub mod chain_trait;
pub mod config;
pub mod derivation;
pub mod error;
pub mod eth;
pub mod keystore;
pub mod mnemonic;
pub mod transfer;
pub mod utils;
pub mod wallet;
pub mod wallet_keeper;
pub mod xrpl;

pub use error::{WalletError, WalletResult};
pub use mnemonic::Mnemonic;
pub use transfer::TransferRequest;
pub use wallet::{SendReceipt, Wallet};
pub use wallet_keeper::WalletKeeper;
