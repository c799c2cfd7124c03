use std::{fmt, path::PathBuf};

use thiserror::Error;

pub type WalletResult<T> = std::result::Result<T, WalletError>;

#[derive(Debug, Error)]
pub enum WalletError {
    /// Rejected before any network or cryptographic work was started.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unsupported keystore format: {0}")]
    UnsupportedFormat(String),

    #[error("Keystore is corrupt: {0}")]
    Corrupt(String),

    #[error("Keystore not found at {}", .0.display())]
    NotFound(PathBuf),

    /// Wrong password and tampered envelope are not distinguished.
    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(String),

    #[error("Transaction failed at {stage}: {source}")]
    TransactionFailed {
        stage: Stage,
        #[source]
        source: Box<WalletError>,
    },

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WalletError {
    pub fn failed_at(stage: Stage) -> impl FnOnce(WalletError) -> WalletError {
        move |source| WalletError::TransactionFailed {
            stage,
            source: Box::new(source),
        }
    }

    pub fn network(context: &str, err: impl fmt::Display) -> Self {
        WalletError::Network(format!("{context}: {err}"))
    }
}

/// Network stage of the account-chain send pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ChainId,
    Nonce,
    FeeData,
    GasEstimation,
    Signing,
    Broadcast,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ChainId => "chain id lookup",
            Stage::Nonce => "nonce lookup",
            Stage::FeeData => "fee lookup",
            Stage::GasEstimation => "gas estimation",
            Stage::Signing => "signing",
            Stage::Broadcast => "broadcast",
        };
        f.write_str(name)
    }
}
