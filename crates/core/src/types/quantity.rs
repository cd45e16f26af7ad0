//! Non-negative stock quantities using decimal arithmetic.
//!
//! Quantities come from hand-typed form input (`"2,5"`, `""`, `"abc"`), so
//! parsing is split in two: [`Quantity::parse`] is strict, while
//! [`Quantity::parse_or`] substitutes a fallback for anything that is not a
//! number and only rejects negative values.

use core::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when building a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The value is below zero.
    #[error("quantity cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input could not be read as a number.
    #[error("quantity is not a number: {0:?}")]
    NotANumber(String),
}

/// A non-negative decimal quantity (kilograms, liters, units, ...).
///
/// Serialized as an exact decimal string (`"2.5"`); deserialized from
/// numbers or numeric strings.
///
/// ## Examples
///
/// ```
/// use pantry_core::Quantity;
///
/// let q = Quantity::parse("2,5").unwrap();
/// assert_eq!(q.to_string(), "2.50");
///
/// // Non-numeric input falls back instead of failing
/// assert_eq!(Quantity::parse_or("abc", Quantity::ONE).unwrap(), Quantity::ONE);
///
/// // Negative input is always rejected
/// assert!(Quantity::parse_or("-3", Quantity::ONE).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Quantity(Decimal);

impl Quantity {
    /// Zero.
    pub const ZERO: Self = Self(Decimal::ZERO);
    /// One. Default for unset thresholds and lot sizes.
    pub const ONE: Self = Self(Decimal::ONE);

    /// Create a quantity from a decimal value.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Negative`] if `value` is below zero.
    pub fn new(value: Decimal) -> Result<Self, QuantityError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(QuantityError::Negative(value));
        }
        Ok(Self(value.normalize()))
    }

    /// Create a quantity from a whole number.
    #[must_use]
    pub fn from_units(units: u32) -> Self {
        Self(Decimal::from(units))
    }

    /// Parse user input strictly.
    ///
    /// Accepts both `.` and `,` as decimal separator.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::NotANumber`] for empty or non-numeric input and
    /// [`QuantityError::Negative`] for values below zero.
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let normalized = normalize_separator(input.trim());
        let value = Decimal::from_str(&normalized)
            .or_else(|_| Decimal::from_scientific(&normalized))
            .map_err(|_| QuantityError::NotANumber(input.to_owned()))?;
        Self::new(value)
    }

    /// Parse user input, substituting `fallback` when it is not a number.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Negative`] for values below zero.
    pub fn parse_or(input: &str, fallback: Self) -> Result<Self, QuantityError> {
        match Self::parse(input) {
            Ok(q) => Ok(q),
            Err(QuantityError::NotANumber(_)) => Ok(fallback),
            Err(e) => Err(e),
        }
    }

    /// Returns the underlying decimal.
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Returns `true` if the quantity is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns `true` if the quantity is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        !self.0.is_zero()
    }

    /// `self - other`, floored at zero.
    #[must_use]
    pub fn saturating_sub(self, other: Self) -> Self {
        if other.0 >= self.0 {
            Self::ZERO
        } else {
            Self((self.0 - other.0).normalize())
        }
    }
}

fn normalize_separator(input: &str) -> String {
    if input.contains(',') && !input.contains('.') {
        input.replace(',', ".")
    } else {
        input.to_owned()
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        write!(f, "{rounded:.2}")
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<Decimal> for Quantity {
    type Error = QuantityError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for Decimal {
    fn from(q: Quantity) -> Self {
        q.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_comma_and_dot() {
        assert_eq!(Quantity::parse("2.5").unwrap(), Quantity::parse("2,5").unwrap());
        assert_eq!(Quantity::parse(" 10 ").unwrap(), Quantity::from_units(10));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            Quantity::parse("abc"),
            Err(QuantityError::NotANumber(_))
        ));
        assert!(matches!(Quantity::parse(""), Err(QuantityError::NotANumber(_))));
        assert!(matches!(Quantity::parse("NaN"), Err(QuantityError::NotANumber(_))));
    }

    #[test]
    fn test_parse_rejects_negative() {
        assert!(matches!(
            Quantity::parse("-1"),
            Err(QuantityError::Negative(_))
        ));
    }

    #[test]
    fn test_negative_zero_is_zero() {
        assert_eq!(Quantity::parse("-0").unwrap(), Quantity::ZERO);
    }

    #[test]
    fn test_parse_or_falls_back_only_for_non_numbers() {
        assert_eq!(Quantity::parse_or("", Quantity::ONE).unwrap(), Quantity::ONE);
        assert_eq!(Quantity::parse_or("x", Quantity::ZERO).unwrap(), Quantity::ZERO);
        assert_eq!(
            Quantity::parse_or("3", Quantity::ONE).unwrap(),
            Quantity::from_units(3)
        );
        assert!(Quantity::parse_or("-3", Quantity::ONE).is_err());
    }

    #[test]
    fn test_display_uses_two_decimals() {
        assert_eq!(Quantity::from_units(3).to_string(), "3.00");
        assert_eq!(Quantity::parse("0,125").unwrap().to_string(), "0.13");
    }

    #[test]
    fn test_saturating_sub() {
        let five = Quantity::from_units(5);
        let two = Quantity::from_units(2);
        assert_eq!(five.saturating_sub(two), Quantity::from_units(3));
        assert_eq!(two.saturating_sub(five), Quantity::ZERO);
    }

    #[test]
    fn test_serde_number_and_string_input() {
        let from_number: Quantity = serde_json::from_str("2.5").unwrap();
        let from_string: Quantity = serde_json::from_str("\"2.5\"").unwrap();
        assert_eq!(from_number, from_string);
        assert!(serde_json::from_str::<Quantity>("-1").is_err());
    }

    #[test]
    fn test_serializes_exact_decimal() {
        assert_eq!(
            serde_json::to_string(&Quantity::from_units(10)).unwrap(),
            "\"10\""
        );
        let precise = Quantity::parse("0.1234567890123456789").unwrap();
        let json = serde_json::to_string(&precise).unwrap();
        assert_eq!(json, "\"0.1234567890123456789\"");
        assert_eq!(serde_json::from_str::<Quantity>(&json).unwrap(), precise);
    }

    #[test]
    fn test_equal_values_compare_equal_regardless_of_scale() {
        assert_eq!(Quantity::parse("5.00").unwrap(), Quantity::from_units(5));
    }
}
