//! Ripple flavoured base58check: a version byte, the payload and the first
//! four bytes of a double SHA-256 over both, written in the Ripple alphabet.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{WalletError, WalletResult};

pub const ACCOUNT_ID_VERSION: u8 = 0x00;
pub const FAMILY_SEED_VERSION: u8 = 0x21;
pub const ACCOUNT_ID_SIZE: usize = 20;
pub const FAMILY_SEED_SIZE: usize = 16;
const CHECKSUM_SIZE: usize = 4;

pub type AccountId = [u8; ACCOUNT_ID_SIZE];

fn checksum(data: &[u8]) -> [u8; CHECKSUM_SIZE] {
    let digest = Sha256::digest(Sha256::digest(data));
    let mut out = [0u8; CHECKSUM_SIZE];
    out.copy_from_slice(&digest[..CHECKSUM_SIZE]);
    out
}

pub fn encode_check(version: u8, payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(1 + payload.len() + CHECKSUM_SIZE);
    data.push(version);
    data.extend_from_slice(payload);
    let check = checksum(&data);
    data.extend_from_slice(&check);
    bs58::encode(data)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_string()
}

pub fn decode_check(encoded: &str, version: u8, payload_len: usize) -> WalletResult<Vec<u8>> {
    let data = bs58::decode(encoded)
        .with_alphabet(bs58::Alphabet::RIPPLE)
        .into_vec()
        .map_err(|e| WalletError::InvalidInput(format!("{encoded:?} is not base58: {e}")))?;

    if data.len() != 1 + payload_len + CHECKSUM_SIZE {
        return Err(WalletError::InvalidInput(format!(
            "{encoded:?} has wrong length"
        )));
    }
    let (body, check) = data.split_at(data.len() - CHECKSUM_SIZE);
    if checksum(body) != check {
        return Err(WalletError::InvalidInput(format!(
            "{encoded:?} has a bad checksum"
        )));
    }
    if body[0] != version {
        return Err(WalletError::InvalidInput(format!(
            "{encoded:?} has unexpected version byte {:#04x}",
            body[0]
        )));
    }
    Ok(body[1..].to_vec())
}

/// RIPEMD-160 of SHA-256 of the compressed public key.
pub fn account_id(public_key: &[u8]) -> AccountId {
    let digest = Ripemd160::digest(Sha256::digest(public_key));
    let mut id = [0u8; ACCOUNT_ID_SIZE];
    id.copy_from_slice(&digest);
    id
}

pub fn encode_classic(account_id: &AccountId) -> String {
    encode_check(ACCOUNT_ID_VERSION, account_id)
}

pub fn decode_classic(address: &str) -> WalletResult<AccountId> {
    let address = address.trim();
    if !address.starts_with('r') {
        return Err(WalletError::InvalidInput(format!(
            "{address:?} is not a classic ledger address"
        )));
    }
    let bytes = decode_check(address, ACCOUNT_ID_VERSION, ACCOUNT_ID_SIZE)?;
    let mut id = [0u8; ACCOUNT_ID_SIZE];
    id.copy_from_slice(&bytes);
    Ok(id)
}

pub fn is_valid_classic(address: &str) -> bool {
    decode_classic(address).is_ok()
}

pub fn encode_family_seed(entropy: &[u8; FAMILY_SEED_SIZE]) -> String {
    encode_check(FAMILY_SEED_VERSION, entropy)
}

pub fn decode_family_seed(seed: &str) -> WalletResult<[u8; FAMILY_SEED_SIZE]> {
    let bytes = decode_check(seed.trim(), FAMILY_SEED_VERSION, FAMILY_SEED_SIZE)?;
    let mut entropy = [0u8; FAMILY_SEED_SIZE];
    entropy.copy_from_slice(&bytes);
    Ok(entropy)
}
