use std::str::FromStr;

use alloy::primitives::{Address, U256, utils};
use bigdecimal::{
    BigDecimal, Zero,
    num_bigint::{BigInt, Sign},
};

use crate::error::{WalletError, WalletResult};

#[derive(Debug, Clone)]
pub struct Token {
    pub address: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

impl Token {
    pub fn new(address: Address, name: String, symbol: String, decimals: u8) -> Self {
        Self {
            address,
            name,
            symbol,
            decimals,
        }
    }

    pub fn format(&self, amount: U256) -> WalletResult<String> {
        format_units(amount, self.decimals)
    }

    pub fn parse(&self, amount: &str) -> WalletResult<U256> {
        to_base_units(amount, self.decimals)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

/// Most decimal digits a `U256` can hold.
const U256_MAX_DIGITS: u64 = 78;

/// "1.5" with 6 decimals is 1500000. Digits past `decimals` are truncated.
pub fn to_base_units(amount: &str, decimals: u8) -> WalletResult<U256> {
    let invalid =
        |reason: String| WalletError::InvalidInput(format!("invalid amount {amount:?}: {reason}"));

    let value = BigDecimal::from_str(amount.trim()).map_err(|e| invalid(e.to_string()))?;
    if value.sign() == Sign::Minus {
        return Err(invalid("negative".into()));
    }
    let units = scale_to_integer(&value, decimals, U256_MAX_DIGITS)
        .ok_or_else(|| invalid("too large".into()))?;
    U256::from_str(&units.to_string()).map_err(|e| invalid(e.to_string()))
}

/// `value * 10^decimals` truncated toward zero, or `None` when the result
/// would have more than `max_digits` integer digits. The digit count is
/// checked first so an exponent like `1e100000000` never reaches bigint math.
pub(crate) fn scale_to_integer(
    value: &BigDecimal,
    decimals: u8,
    max_digits: u64,
) -> Option<BigInt> {
    if value.is_zero() {
        return Some(BigInt::zero());
    }
    let integer_digits = i128::from(value.digits()) - i128::from(value.fractional_digit_count())
        + i128::from(decimals);
    if integer_digits > i128::from(max_digits) {
        return None;
    }
    if integer_digits <= 0 {
        return Some(BigInt::zero());
    }
    let scale = BigDecimal::new(BigInt::from(1), -i64::from(decimals));
    let (units, _) = (value * scale).with_scale(0).into_bigint_and_exponent();
    Some(units)
}

/// Human readable amount without trailing zeros.
pub fn format_units(amount: U256, decimals: u8) -> WalletResult<String> {
    let formatted = utils::format_units(amount, decimals)
        .map_err(|e| WalletError::InvalidInput(format!("cannot format amount: {e}")))?;
    if !formatted.contains('.') {
        return Ok(formatted);
    }
    Ok(formatted
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string())
}
