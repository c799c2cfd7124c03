use std::{fmt, str::FromStr};

use alloy::{
    hex,
    primitives::{Address, B256},
};
use alloy_signer_local::PrivateKeySigner;

use crate::{
    chain_trait::{KeyMaterial, SecureKey},
    derivation::{CoinType, DerivePath, derive_private_key},
    error::{WalletError, WalletResult},
    mnemonic::Seed,
};

/// Account chain signing key at m/44'/60'/0'/0/0.
pub struct AccountKey {
    signer: PrivateKeySigner,
}

impl AccountKey {
    pub fn from_private_key(key: &[u8; 32]) -> WalletResult<Self> {
        let signer = PrivateKeySigner::from_bytes(&B256::from(*key))
            .map_err(|e| WalletError::Crypto(format!("invalid account key: {e}")))?;
        Ok(Self { signer })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// EIP-55 checksummed address.
    pub fn checksum_address(&self) -> String {
        self.address().to_checksum(None)
    }

    /// Uncompressed SEC1 public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.signer
            .credential()
            .verifying_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec()
    }
}

impl SecureKey for AccountKey {
    type Material = PrivateKeySigner;

    fn expose(&self) -> &Self::Material {
        &self.signer
    }
}

impl KeyMaterial for AccountKey {
    fn public_key_hex(&self) -> String {
        hex::encode_prefixed(self.public_key())
    }

    fn address(&self) -> String {
        self.checksum_address()
    }
}

impl fmt::Debug for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountKey")
            .field("address", &self.checksum_address())
            .finish_non_exhaustive()
    }
}

pub fn derive_account_chain_key(seed: &Seed) -> WalletResult<AccountKey> {
    let private_key = derive_private_key(seed, &DerivePath::default_for(CoinType::Ethereum))?;
    AccountKey::from_private_key(&private_key)
}

/// Accepts 0x-prefixed hex in a single case, or mixed case with a valid
/// EIP-55 checksum.
pub fn parse_address(address: &str) -> WalletResult<Address> {
    let address = address.trim();
    let invalid = |reason: &str| {
        WalletError::InvalidInput(format!("invalid account address {address:?}: {reason}"))
    };

    let body = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .ok_or_else(|| invalid("missing 0x prefix"))?;
    let parsed = Address::from_str(body).map_err(|e| invalid(&e.to_string()))?;

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(format!("0x{body}"), None)
            .map_err(|_| invalid("bad EIP-55 checksum"))?;
    }
    Ok(parsed)
}
