//! Amount type for the money values a user enters.
//!
//! This module provides the `Amount` type, which wraps `Decimal` and handles parsing values that
//! may or may not include a currency symbol and commas. Entered amounts are never negative; the
//! sign is applied later, when the amount is placed into a row.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The number of decimal places an entered amount is kept to (a step of 0.01).
const SCALE: u32 = 2;

/// The default currency symbol used when displaying money.
pub const DEFAULT_CURRENCY: &str = "₱";

/// Represents a non-negative money amount entered by the user, kept to cent precision.
///
/// # Examples
///
/// Parsing with a currency symbol and commas:
/// ```
/// # use quick_entry::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("₱1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "1250.50");
/// ```
///
/// Negative input is rejected:
/// ```
/// # use quick_entry::model::Amount;
/// # use std::str::FromStr;
/// assert!(Amount::from_str("-5").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    /// Zero. A zero amount can be parsed but never submitted.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Creates a new `Amount`, rounding to cent precision. Returns an error if `value` is negative.
    pub fn new(value: Decimal) -> Result<Self, AmountError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(AmountError::Negative(value));
        }
        let mut rounded = value.round_dp_with_strategy(SCALE, RoundingStrategy::MidpointAwayFromZero);
        rounded.rescale(SCALE);
        // -0.00 prints as "-0.00", which is not what anyone typed.
        rounded.set_sign_positive(true);
        Ok(Self(rounded))
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The amount as a credit (positive).
    pub fn credit(&self) -> Decimal {
        self.0
    }

    /// The amount as a debit (negative).
    pub fn debit(&self) -> Decimal {
        -self.0
    }
}

impl std::ops::Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Self) -> Self::Output {
        // Both sides are non-negative with the same scale, so the sum is too.
        Amount(self.0 + rhs.0)
    }
}

/// An error that can occur when parsing strings into `Amount` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The text is not a number.
    Parse(String),
    /// The number is negative.
    Negative(Decimal),
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            AmountError::Parse(s) => write!(f, "'{s}' is not a valid amount"),
            AmountError::Negative(d) => {
                write!(f, "amounts must be positive values, got {d}")
            }
        }
    }
}

impl std::error::Error for AmountError {}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        // An untouched number field holds zero.
        if trimmed.is_empty() {
            return Ok(Amount::ZERO);
        }

        let parse_error = || AmountError::Parse(trimmed.to_string());

        // The sign may come before or after a currency symbol, e.g. "-₱5" or "₱-5".
        let (mut negative, mut rest) = strip_sign(trimmed);

        // Drop one currency symbol in front of the digits, e.g. "₱" or "$".
        if let Some(symbol) = rest
            .chars()
            .next()
            .filter(|c| !c.is_ascii_digit() && !matches!(c, '.' | '-' | '+'))
        {
            rest = rest[symbol.len_utf8()..].trim_start();
            if !negative {
                (negative, rest) = strip_sign(rest);
            }
        }

        // Remove commas (thousand separators)
        let without_commas = rest.replace(',', "");
        if without_commas.is_empty()
            || !without_commas.chars().all(|c| c.is_ascii_digit() || c == '.')
        {
            return Err(parse_error());
        }

        let value = Decimal::from_str(&without_commas).map_err(|_| parse_error())?;
        Amount::new(if negative { -value } else { value })
    }
}

/// Splits a leading minus sign off `s`.
fn strip_sign(s: &str) -> (bool, &str) {
    match s.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, s),
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Displays a signed decimal as money with a currency symbol and thousands separators, e.g.
/// `-₱1,050.00`.
#[derive(Debug, Clone, Copy)]
pub struct Money<'a> {
    value: Decimal,
    currency: &'a str,
}

impl<'a> Money<'a> {
    pub fn new(value: impl Into<Decimal>, currency: &'a str) -> Self {
        Self {
            value: value.into(),
            currency,
        }
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}

impl Display for Money<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.value.is_sign_negative() && !self.value.is_zero() {
            ("-", self.value.abs())
        } else {
            ("", self.value.abs())
        };
        write!(
            f,
            "{sign}{}{}",
            self.currency,
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_plain() {
        let amount = Amount::from_str("50").unwrap();
        assert_eq!(amount.value(), dec("50.00"));
        assert_eq!(amount.to_string(), "50.00");
    }

    #[test]
    fn test_parse_with_symbol_and_commas() {
        assert_eq!(Amount::from_str("₱1,234.5").unwrap().value(), dec("1234.50"));
        assert_eq!(Amount::from_str("$60,000.00").unwrap().value(), dec("60000"));
        assert_eq!(Amount::from_str("  12.25  ").unwrap().value(), dec("12.25"));
    }

    #[test]
    fn test_parse_empty_is_zero() {
        assert!(Amount::from_str("").unwrap().is_zero());
        assert!(Amount::from_str("0.00").unwrap().is_zero());
    }

    #[test]
    fn test_parse_negative_rejected() {
        assert!(matches!(
            Amount::from_str("-5.00"),
            Err(AmountError::Negative(_))
        ));
        assert!(matches!(
            Amount::from_str("-₱5.00"),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_parse_negative_after_symbol_rejected() {
        assert!(matches!(
            Amount::from_str("₱-5"),
            Err(AmountError::Negative(_))
        ));
        assert!(matches!(
            Amount::from_str("$ -7.5"),
            Err(AmountError::Negative(_))
        ));
    }

    #[test]
    fn test_parse_text_around_digits_rejected() {
        assert!(matches!(
            Amount::from_str("abc12"),
            Err(AmountError::Parse(_))
        ));
        assert!(Amount::from_str("12abc").is_err());
        assert!(Amount::from_str("₱").is_err());
        assert!(Amount::from_str("--5").is_err());
        assert!(Amount::from_str("+5").is_err());
    }

    #[test]
    fn test_negative_zero_is_zero() {
        let amount = Amount::from_str("-0").unwrap();
        assert!(amount.is_zero());
        assert_eq!(amount.to_string(), "0.00");
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Amount::from_str("abc"),
            Err(AmountError::Parse(_))
        ));
        assert!(Amount::from_str("12.3.4").is_err());
    }

    #[test]
    fn test_rounds_to_cents() {
        assert_eq!(Amount::from_str("1.005").unwrap().value(), dec("1.01"));
        assert_eq!(Amount::from_str("1.004").unwrap().value(), dec("1.00"));
    }

    #[test]
    fn test_debit_credit() {
        let amount = Amount::from_str("100").unwrap();
        assert_eq!(amount.debit(), dec("-100"));
        assert_eq!(amount.credit(), dec("100"));
    }

    #[test]
    fn test_add() {
        let sum = Amount::from_str("100").unwrap() + Amount::from_str("5").unwrap();
        assert_eq!(sum.value(), dec("105"));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::new(dec("1234.5"), "₱").to_string(), "₱1,234.50");
        assert_eq!(Money::new(dec("-105"), "₱").to_string(), "-₱105.00");
        assert_eq!(Money::new(dec("0"), "$").to_string(), "$0.00");
    }

    #[test]
    fn test_serde() {
        let amount = Amount::from_str("7.5").unwrap();
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, "\"7.50\"");
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);
    }
}
