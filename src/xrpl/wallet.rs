use std::fmt;

use alloy::hex;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::{
    chain_trait::{KeyMaterial, SecureKey},
    derivation::{CoinType, DerivePath, derive_private_key},
    error::WalletResult,
    mnemonic::Seed,
    xrpl::{
        address::{
            FAMILY_SEED_SIZE, account_id, decode_family_seed, encode_classic, encode_family_seed,
        },
        keypair::{Keypair, PUBLIC_KEY_SIZE},
    },
};

/// Family seed of the genesis account on a freshly started ledger.
pub const GENESIS_FAMILY_SEED: &str = "snoPBrXtMeMyMHUVTgbuqAfg1SUTb";
pub const GENESIS_ADDRESS: &str = "rHb9CJAWyB4rj91VRWn96DkukG4bwdtyTh";

/// Ledger chain signing key with its native family seed and classic address.
pub struct LedgerKey {
    family_seed: Zeroizing<String>,
    keypair: Keypair,
    classic_address: String,
}

impl LedgerKey {
    pub fn from_entropy(entropy: &[u8; FAMILY_SEED_SIZE]) -> WalletResult<Self> {
        let keypair = Keypair::from_entropy(entropy)?;
        let classic_address = encode_classic(&account_id(keypair.public_key()));
        Ok(Self {
            family_seed: Zeroizing::new(encode_family_seed(entropy)),
            keypair,
            classic_address,
        })
    }

    pub fn from_family_seed(seed: &str) -> WalletResult<Self> {
        let entropy = Zeroizing::new(decode_family_seed(seed)?);
        Self::from_entropy(&entropy)
    }

    pub fn classic_address(&self) -> &str {
        &self.classic_address
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        self.keypair.public_key()
    }

    pub fn family_seed(&self) -> &str {
        &self.family_seed
    }

    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }
}

impl SecureKey for LedgerKey {
    type Material = Keypair;

    fn expose(&self) -> &Self::Material {
        &self.keypair
    }
}

impl KeyMaterial for LedgerKey {
    fn public_key_hex(&self) -> String {
        hex::encode_upper(self.public_key())
    }

    fn address(&self) -> String {
        self.classic_address.clone()
    }
}

impl fmt::Debug for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerKey")
            .field("classic_address", &self.classic_address)
            .finish_non_exhaustive()
    }
}

/// BIP-44 key at m/44'/144'/0'/0/0, compressed to 16 bytes of family seed
/// entropy as the first half of its SHA-256. Changing the hash or the cut
/// changes every derived address.
pub fn derive_ledger_chain_key(seed: &Seed) -> WalletResult<LedgerKey> {
    let private_key = derive_private_key(seed, &DerivePath::default_for(CoinType::Ripple))?;
    let digest = Sha256::digest(private_key.as_slice());

    let mut entropy = Zeroizing::new([0u8; FAMILY_SEED_SIZE]);
    entropy.copy_from_slice(&digest[..FAMILY_SEED_SIZE]);
    LedgerKey::from_entropy(&entropy)
}
