use alloy::hex;
use serde::{Deserialize, Serialize};

use crate::{
    error::{WalletError, WalletResult},
    xrpl::{
        address::decode_classic,
        binary::{FieldValue, HASH_PREFIX_TX_ID, HASH_PREFIX_TX_SIGN, Serializer, fields},
        keypair::sha512_half,
        wallet::LedgerKey,
    },
};

const PAYMENT_TRANSACTION_TYPE: u16 = 0;
/// tfFullyCanonicalSig
pub const FLAG_FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

/// Native currency payment. `sequence`, `fee_drops` and
/// `last_ledger_sequence` are network dependent and filled by autofill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub account: String,
    pub destination: String,
    pub amount_drops: u64,
    pub destination_tag: Option<u32>,
    pub flags: u32,
    pub sequence: Option<u32>,
    pub fee_drops: Option<u64>,
    pub last_ledger_sequence: Option<u32>,
}

impl Payment {
    pub fn new(account: String, destination: String, amount_drops: u64) -> Self {
        Self {
            account,
            destination,
            amount_drops,
            destination_tag: None,
            flags: FLAG_FULLY_CANONICAL_SIG,
            sequence: None,
            fee_drops: None,
            last_ledger_sequence: None,
        }
    }

    pub fn with_destination_tag(mut self, tag: Option<u32>) -> Self {
        self.destination_tag = tag;
        self
    }

    pub fn is_autofilled(&self) -> bool {
        self.sequence.is_some() && self.fee_drops.is_some() && self.last_ledger_sequence.is_some()
    }

    fn serialize(&self, signing_pub_key: &[u8], signature: Option<&[u8]>) -> WalletResult<Vec<u8>> {
        let missing = |field: &str| {
            WalletError::InvalidInput(format!("payment is not autofilled: {field} is missing"))
        };
        let sequence = self.sequence.ok_or_else(|| missing("Sequence"))?;
        let fee = self.fee_drops.ok_or_else(|| missing("Fee"))?;
        let last_ledger = self
            .last_ledger_sequence
            .ok_or_else(|| missing("LastLedgerSequence"))?;

        let mut serializer = Serializer::new();
        serializer
            .field(
                fields::TRANSACTION_TYPE,
                FieldValue::UInt16(PAYMENT_TRANSACTION_TYPE),
            )
            .field(fields::FLAGS, FieldValue::UInt32(self.flags))
            .field(fields::SEQUENCE, FieldValue::UInt32(sequence))
            .field(fields::LAST_LEDGER_SEQUENCE, FieldValue::UInt32(last_ledger))
            .field(fields::AMOUNT, FieldValue::Drops(self.amount_drops))
            .field(fields::FEE, FieldValue::Drops(fee))
            .field(
                fields::SIGNING_PUB_KEY,
                FieldValue::Blob(signing_pub_key.to_vec()),
            )
            .field(
                fields::ACCOUNT,
                FieldValue::Account(decode_classic(&self.account)?),
            )
            .field(
                fields::DESTINATION,
                FieldValue::Account(decode_classic(&self.destination)?),
            );
        if let Some(tag) = self.destination_tag {
            serializer.field(fields::DESTINATION_TAG, FieldValue::UInt32(tag));
        }
        if let Some(signature) = signature {
            serializer.field(fields::TXN_SIGNATURE, FieldValue::Blob(signature.to_vec()));
        }
        serializer.finish()
    }

    /// Digest the account key signs.
    pub fn signing_hash(&self, signing_pub_key: &[u8]) -> WalletResult<[u8; 32]> {
        let mut message = HASH_PREFIX_TX_SIGN.to_vec();
        message.extend(self.serialize(signing_pub_key, None)?);
        Ok(sha512_half(&message))
    }

    pub fn sign(&self, key: &LedgerKey) -> WalletResult<SignedPayment> {
        if self.account != key.classic_address() {
            return Err(WalletError::InvalidInput(format!(
                "payment account {} does not match signing key {}",
                self.account,
                key.classic_address()
            )));
        }
        let public_key = key.public_key();
        let digest = self.signing_hash(public_key)?;
        let signature = key.keypair().sign_digest(&digest)?;
        let blob = self.serialize(public_key, Some(&signature))?;

        Ok(SignedPayment {
            tx_blob: hex::encode_upper(&blob),
            hash: Some(transaction_id(&blob)),
        })
    }
}

/// Hex encoded signed blob plus its transaction id. A missing hash marks a
/// payload whose id could not be computed; it is submitted but not polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayment {
    pub tx_blob: String,
    pub hash: Option<String>,
}

pub fn transaction_id(signed_blob: &[u8]) -> String {
    let mut message = HASH_PREFIX_TX_ID.to_vec();
    message.extend_from_slice(signed_blob);
    hex::encode_upper(sha512_half(&message))
}
