use std::{fmt::Display, str::FromStr};

use bip32::{DerivationPath, XPrv};
use zeroize::Zeroizing;

use crate::{
    error::{WalletError, WalletResult},
    mnemonic::Seed,
};

pub const PURPOSE_BIP44: u32 = 44;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinType {
    Ethereum = 60,
    Ripple = 144,
}

#[derive(Debug, Clone, PartialEq, Copy, Eq, Hash)]
pub enum Change {
    /// Receiving addresses
    External = 0,
    Internal = 1,
}

/// m / 44' / coin_type' / account' / change / address_index
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DerivePath {
    pub coin_type: CoinType,
    pub account: u32,
    pub change: Change,
    pub index: u32,
}

impl DerivePath {
    /// First receiving address of the first account.
    pub const fn default_for(coin_type: CoinType) -> Self {
        Self {
            coin_type,
            account: 0,
            change: Change::External,
            index: 0,
        }
    }

    pub fn to_path(&self) -> WalletResult<DerivationPath> {
        DerivationPath::from_str(&self.to_string())
            .map_err(|e| WalletError::Crypto(format!("invalid derivation path {self}: {e}")))
    }
}

impl Display for DerivePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "m/{PURPOSE_BIP44}'/{}'/{}'/{}/{}",
            self.coin_type as u32, self.account, self.change as u32, self.index
        )
    }
}

/// Walks the BIP-32 secp256k1 tree from the seed and returns the raw 32-byte
/// private key at `path`.
pub fn derive_private_key(seed: &Seed, path: &DerivePath) -> WalletResult<Zeroizing<[u8; 32]>> {
    let xprv = XPrv::derive_from_path(seed.as_bytes(), &path.to_path()?)
        .map_err(|e| WalletError::Crypto(format!("derivation along {path} failed: {e}")))?;
    let key: [u8; 32] = xprv.private_key().to_bytes().into();
    Ok(Zeroizing::new(key))
}
