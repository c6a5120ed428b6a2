//! Exact conversion between human decimal amounts and integer minor units.
//!
//! Amounts never pass through floating-point arithmetic. Scaling a decimal
//! by `10^decimals` is done on its digit string, so `1.5` at 6 decimals is
//! always `1_500_000` and `0.000000001` at 9 decimals is always `1`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TrezoaPayError;

/// A non-negative amount expressed in minor units (no implicit decimal point).
///
/// Held as a `u128` so that 18-decimal tokens keep their full range. Ledger
/// instructions carry 64-bit amounts; see [`Amount::to_ledger_units`].
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Creates an amount from a raw minor-unit value.
    #[must_use]
    pub const fn from_minor_units(value: u128) -> Self {
        Self(value)
    }

    /// Returns the raw minor-unit value.
    #[must_use]
    pub const fn minor_units(self) -> u128 {
        self.0
    }

    /// Returns the value as carried in ledger instruction data.
    ///
    /// # Errors
    ///
    /// Returns [`TrezoaPayError::InvalidAmount`] if the value exceeds `u64::MAX`.
    pub fn to_ledger_units(self) -> Result<u64, TrezoaPayError> {
        u64::try_from(self.0).map_err(|_| {
            TrezoaPayError::InvalidAmount(format!(
                "{} minor units exceed the 64-bit ledger amount",
                self.0
            ))
        })
    }

    /// Formats the amount as a decimal string with `decimals` fractional digits.
    ///
    /// See [`to_decimal_string`].
    #[must_use]
    pub fn to_decimal_string(self, decimals: u8) -> String {
        format_scaled("", self.0, decimals)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<Amount> for u128 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Converts a human decimal amount to minor units.
///
/// The amount is formatted with exactly `decimals` fractional digits, the
/// integer and fractional digits are concatenated, and the result is read as
/// a base-10 integer.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidAmount`] if `amount` is not finite or is
/// negative, if `decimals` is negative or above 255, or if the scaled value
/// does not fit in a `u128`.
pub fn to_minor_units(amount: f64, decimals: i32) -> Result<Amount, TrezoaPayError> {
    if !amount.is_finite() {
        return Err(TrezoaPayError::InvalidAmount(format!(
            "{amount} is not a finite number"
        )));
    }
    if amount < 0.0 {
        return Err(TrezoaPayError::InvalidAmount(format!(
            "{amount} is negative"
        )));
    }
    let Ok(decimals) = u8::try_from(decimals) else {
        return Err(TrezoaPayError::InvalidAmount(format!(
            "decimals must be between 0 and 255, got {decimals}"
        )));
    };

    // abs() folds -0.0 into 0.0 so no sign reaches the digit string.
    let formatted = format!("{:.*}", usize::from(decimals), amount.abs());
    let digits: String = formatted.chars().filter(|c| *c != '.').collect();
    digits.parse::<u128>().map(Amount).map_err(|_| {
        TrezoaPayError::InvalidAmount(format!(
            "{amount} with {decimals} decimals does not fit in 128 bits"
        ))
    })
}

/// Formats a minor-unit value as a decimal string.
///
/// The value is split at the `decimals`-th digit from the right, trailing
/// fractional zeros are removed, and the separator is omitted when nothing
/// remains after it. Negative values keep their leading `-`.
#[must_use]
pub fn to_decimal_string(value: i128, decimals: u8) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format_scaled(sign, value.unsigned_abs(), decimals)
}

fn format_scaled(sign: &str, magnitude: u128, decimals: u8) -> String {
    let decimals = usize::from(decimals);
    let digits = format!("{magnitude:0>width$}", width = decimals + 1);
    let (integer, fraction) = digits.split_at(digits.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        format!("{sign}{integer}")
    } else {
        format!("{sign}{integer}.{fraction}")
    }
}

/// Parses a plain decimal string into minor units.
///
/// Accepts digits with at most one `.`; signs, exponents and digit
/// separators are rejected.
///
/// # Errors
///
/// Returns [`TrezoaPayError::InvalidAmount`] if `s` is not a plain
/// non-negative decimal, has more than `decimals` significant fractional
/// digits, or does not fit in a `u128` once scaled.
pub fn parse_decimal_amount(s: &str, decimals: u8) -> Result<Amount, TrezoaPayError> {
    let invalid = |reason: &str| TrezoaPayError::InvalidAmount(format!("{s:?} {reason}"));

    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit() || b == b'.') {
        return Err(invalid("is not a plain decimal number"));
    }
    let value = Decimal::from_str_exact(s)
        .map_err(|_| invalid("is not a plain decimal number"))?
        .normalize();
    let scale = value.scale();
    if scale > u32::from(decimals) {
        return Err(invalid(&format!(
            "has more than {decimals} fractional digits"
        )));
    }
    u128::try_from(value.mantissa())
        .ok()
        .zip(10u128.checked_pow(u32::from(decimals) - scale))
        .and_then(|(mantissa, factor)| mantissa.checked_mul(factor))
        .map(Amount)
        .ok_or_else(|| invalid("does not fit in 128 bits"))
}
