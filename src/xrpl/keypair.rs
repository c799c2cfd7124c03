use k256::{
    NonZeroScalar, PublicKey, SecretKey,
    ecdsa::{Signature, SigningKey, VerifyingKey, signature::hazmat::PrehashSigner},
    elliptic_curve::sec1::ToEncodedPoint,
};
use sha2::{Digest, Sha512};

use crate::{
    error::{WalletError, WalletResult},
    xrpl::address::FAMILY_SEED_SIZE,
};

pub const PUBLIC_KEY_SIZE: usize = 33;

/// First 32 bytes of SHA-512.
pub fn sha512_half(data: &[u8]) -> [u8; 32] {
    let digest = Sha512::digest(data);
    let mut half = [0u8; 32];
    half.copy_from_slice(&digest[..32]);
    half
}

/// secp256k1 keypair of a family seed: root generator plus the account 0
/// intermediate key.
pub struct Keypair {
    signing_key: SigningKey,
    public_key: [u8; PUBLIC_KEY_SIZE],
}

impl Keypair {
    pub fn from_entropy(entropy: &[u8; FAMILY_SEED_SIZE]) -> WalletResult<Self> {
        let root = derive_scalar(entropy, None)?;
        let root_public = compressed(&PublicKey::from_secret_scalar(&root));

        let intermediate = derive_scalar(&root_public, Some(0))?;
        let sum = *root + *intermediate;
        let scalar = Option::<NonZeroScalar>::from(NonZeroScalar::new(sum))
            .ok_or_else(|| WalletError::Crypto("derived account key is zero".into()))?;

        let public_key = compressed(&PublicKey::from_secret_scalar(&scalar));
        Ok(Self {
            signing_key: SigningKey::from(scalar),
            public_key,
        })
    }

    pub fn public_key(&self) -> &[u8; PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    pub fn verifying_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// DER encoded, low-S signature over a 32 byte digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> WalletResult<Vec<u8>> {
        let signature: Signature = self
            .signing_key
            .sign_prehash(digest)
            .map_err(|e| WalletError::Crypto(format!("ledger signing failed: {e}")))?;
        let signature = signature.normalize_s().unwrap_or(signature);
        Ok(signature.to_der().as_bytes().to_vec())
    }
}

fn compressed(public_key: &PublicKey) -> [u8; PUBLIC_KEY_SIZE] {
    let point = public_key.to_encoded_point(true);
    let mut out = [0u8; PUBLIC_KEY_SIZE];
    out.copy_from_slice(point.as_bytes());
    out
}

/// Hashes `bytes ‖ [discriminator] ‖ counter` until the half digest is a
/// valid secret scalar.
fn derive_scalar(bytes: &[u8], discriminator: Option<u32>) -> WalletResult<NonZeroScalar> {
    for counter in 0..=u32::MAX {
        let mut hasher = Sha512::new();
        hasher.update(bytes);
        if let Some(discriminator) = discriminator {
            hasher.update(discriminator.to_be_bytes());
        }
        hasher.update(counter.to_be_bytes());
        let digest = hasher.finalize();

        if let Ok(secret) = SecretKey::from_slice(&digest[..32]) {
            return Ok(secret.to_nonzero_scalar());
        }
    }
    Err(WalletError::Crypto("no valid secp256k1 scalar found".into()))
}
