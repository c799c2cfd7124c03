//! Canonical binary field encoding used for signing and submission.
//! Fields are emitted sorted by (type code, field code).

use crate::{
    error::{WalletError, WalletResult},
    xrpl::address::AccountId,
};

pub const HASH_PREFIX_TX_SIGN: [u8; 4] = [0x53, 0x54, 0x58, 0x00];
pub const HASH_PREFIX_TX_ID: [u8; 4] = [0x54, 0x58, 0x4E, 0x00];

/// 100 billion XRP.
pub const MAX_DROPS: u64 = 100_000_000_000_000_000;
const NATIVE_POSITIVE: u64 = 0x4000_0000_0000_0000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FieldCode {
    pub type_code: u8,
    pub nth: u8,
}

impl FieldCode {
    const fn new(type_code: u8, nth: u8) -> Self {
        Self { type_code, nth }
    }

    fn header(self) -> Vec<u8> {
        let Self { type_code, nth } = self;
        match (type_code < 16, nth < 16) {
            (true, true) => vec![(type_code << 4) | nth],
            (true, false) => vec![type_code << 4, nth],
            (false, true) => vec![nth, type_code],
            (false, false) => vec![0, type_code, nth],
        }
    }
}

pub mod fields {
    use super::FieldCode;

    pub const TRANSACTION_TYPE: FieldCode = FieldCode::new(1, 2);
    pub const FLAGS: FieldCode = FieldCode::new(2, 2);
    pub const SEQUENCE: FieldCode = FieldCode::new(2, 4);
    pub const DESTINATION_TAG: FieldCode = FieldCode::new(2, 14);
    pub const LAST_LEDGER_SEQUENCE: FieldCode = FieldCode::new(2, 27);
    pub const AMOUNT: FieldCode = FieldCode::new(6, 1);
    pub const FEE: FieldCode = FieldCode::new(6, 8);
    pub const SIGNING_PUB_KEY: FieldCode = FieldCode::new(7, 3);
    pub const TXN_SIGNATURE: FieldCode = FieldCode::new(7, 4);
    pub const ACCOUNT: FieldCode = FieldCode::new(8, 1);
    pub const DESTINATION: FieldCode = FieldCode::new(8, 3);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    UInt16(u16),
    UInt32(u32),
    /// Native amount in drops.
    Drops(u64),
    Blob(Vec<u8>),
    Account(AccountId),
}

#[derive(Debug, Default)]
pub struct Serializer {
    fields: Vec<(FieldCode, FieldValue)>,
}

impl Serializer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(&mut self, code: FieldCode, value: FieldValue) -> &mut Self {
        self.fields.push((code, value));
        self
    }

    pub fn finish(mut self) -> WalletResult<Vec<u8>> {
        self.fields.sort_by_key(|(code, _)| *code);
        if let Some(pair) = self.fields.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(WalletError::Crypto(format!(
                "field {:?} set twice",
                pair[0].0
            )));
        }

        let mut out = Vec::new();
        for (code, value) in &self.fields {
            out.extend(code.header());
            match value {
                FieldValue::UInt16(v) => out.extend(v.to_be_bytes()),
                FieldValue::UInt32(v) => out.extend(v.to_be_bytes()),
                FieldValue::Drops(drops) => out.extend(encode_drops(*drops)?),
                FieldValue::Blob(bytes) => {
                    out.extend(encode_length(bytes.len())?);
                    out.extend(bytes);
                }
                FieldValue::Account(id) => {
                    out.extend(encode_length(id.len())?);
                    out.extend(id);
                }
            }
        }
        Ok(out)
    }
}

pub fn encode_drops(drops: u64) -> WalletResult<[u8; 8]> {
    if drops > MAX_DROPS {
        return Err(WalletError::InvalidInput(format!(
            "{drops} drops exceeds the native currency supply"
        )));
    }
    Ok((drops | NATIVE_POSITIVE).to_be_bytes())
}

pub fn encode_length(len: usize) -> WalletResult<Vec<u8>> {
    match len {
        0..=192 => Ok(vec![len as u8]),
        193..=12480 => {
            let len = len - 193;
            Ok(vec![193 + (len >> 8) as u8, (len & 0xff) as u8])
        }
        12481..=918744 => {
            let len = len - 12481;
            Ok(vec![
                241 + (len >> 16) as u8,
                ((len >> 8) & 0xff) as u8,
                (len & 0xff) as u8,
            ])
        }
        _ => Err(WalletError::InvalidInput(format!(
            "variable length field of {len} bytes is too long"
        ))),
    }
}
