use std::fmt;

use bip39::Language;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{WalletError, WalletResult};

/// Word counts defined by BIP-39.
pub const VALID_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];
/// 128 bits of entropy, a 12 word phrase.
pub const ENTROPY_BYTES: usize = 16;
pub const SEED_BYTES: usize = 64;

pub const TEST_MNEMONIC: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

/// BIP-39 phrase held only in process memory. Wiped on drop.
pub struct Mnemonic {
    inner: bip39::Mnemonic,
}

impl Mnemonic {
    pub fn generate() -> WalletResult<Self> {
        let entropy = Zeroizing::new(rand::random::<[u8; ENTROPY_BYTES]>());
        let inner = bip39::Mnemonic::from_entropy_in(Language::English, entropy.as_ref())
            .map_err(|e| WalletError::Crypto(format!("failed to encode entropy: {e}")))?;
        Ok(Self { inner })
    }

    /// Parses a user supplied phrase. The word count is checked before the
    /// wordlist and checksum so a truncated paste gets a precise error.
    pub fn parse(phrase: &str) -> WalletResult<Self> {
        let normalized = Zeroizing::new(phrase.split_whitespace().collect::<Vec<_>>().join(" "));
        validate_word_count(&normalized)?;
        let inner = bip39::Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|e| WalletError::InvalidInput(format!("invalid seed phrase: {e}")))?;
        Ok(Self { inner })
    }

    pub fn word_count(&self) -> usize {
        self.inner.word_count()
    }

    pub fn phrase(&self) -> Zeroizing<String> {
        Zeroizing::new(self.inner.to_string())
    }

    /// Seed with an empty BIP-39 passphrase.
    pub fn to_seed(&self) -> Seed {
        Seed(Zeroizing::new(self.inner.to_seed_normalized("")))
    }
}

impl Drop for Mnemonic {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

impl PartialEq for Mnemonic {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl fmt::Debug for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mnemonic({} words)", self.word_count())
    }
}

pub fn validate_word_count(phrase: &str) -> WalletResult<()> {
    let count = phrase.split_whitespace().count();
    if !VALID_WORD_COUNTS.contains(&count) {
        return Err(WalletError::InvalidInput(format!(
            "seed phrase should be 12/15/18/21/24 words, got {count}"
        )));
    }
    Ok(())
}

/// Root of every chain key. Never persisted.
pub struct Seed(Zeroizing<[u8; SEED_BYTES]>);

impl Seed {
    pub fn as_bytes(&self) -> &[u8; SEED_BYTES] {
        &self.0
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Seed(..)")
    }
}
