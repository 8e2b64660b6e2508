//! Exact conversion between decimal strings and raw token units.
//!
//! Everything here is string and integer arithmetic on `U256`; no value
//! ever passes through a float.

use std::fmt;

use alloy::primitives::U256;
use thiserror::Error;

/// Fractional precision of the SIMP token.
pub const TOKEN_DECIMALS: u8 = 18;

/// Reasons a decimal string cannot be turned into token units.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,

    #[error("'{0}' is not a decimal number")]
    Malformed(String),

    #[error("too many decimal places (max {max})")]
    TooManyDecimals { max: u8 },

    #[error("amount must be greater than zero")]
    NotPositive,

    #[error("amount is too large")]
    Overflow,
}

/// A token quantity in raw base units (`value * 10^18`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const ZERO: Self = Self(U256::ZERO);

    pub fn from_raw(raw: U256) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse a non-negative decimal string such as `30.5` or `.25`.
    pub fn from_decimal_str(input: &str) -> Result<Self, AmountError> {
        parse_units(input, TOKEN_DECIMALS).map(Self)
    }

    /// Parse a decimal string that must be strictly positive.
    pub fn parse_positive(input: &str) -> Result<Self, AmountError> {
        let amount = Self::from_decimal_str(input)?;
        if amount.is_zero() {
            return Err(AmountError::NotPositive);
        }
        Ok(amount)
    }

    pub fn checked_sub(&self, other: TokenAmount) -> Option<TokenAmount> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_units(self.0, TOKEN_DECIMALS))
    }
}

/// Scale a decimal string to an integer with `decimals` fractional digits.
pub fn parse_units(input: &str, decimals: u8) -> Result<U256, AmountError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AmountError::Empty);
    }
    if s.starts_with('-') {
        return Err(AmountError::NotPositive);
    }

    let (int_part, frac_part) = s.split_once('.').unwrap_or((s, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return Err(AmountError::Malformed(s.to_string()));
    }

    let decimals = usize::from(decimals);
    if frac_part.len() > decimals {
        return Err(AmountError::TooManyDecimals {
            max: decimals as u8,
        });
    }

    let mut digits = String::with_capacity(int_part.len() + decimals);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    digits.extend(std::iter::repeat('0').take(decimals - frac_part.len()));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).map_err(|_| AmountError::Overflow)
}

/// Render raw units as a decimal string with trailing zeros trimmed,
/// keeping at least one fractional digit (`100.0`, `69.5`).
pub fn format_units(value: U256, decimals: u8) -> String {
    let digits = value.to_string();
    let decimals = usize::from(decimals);

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>width$}", digits, width = decimals))
    };

    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        format!("{}.0", int_part)
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}
