//! Type-safe price representation.
//!
//! Prices are whole amounts in the smallest currency unit the store trades
//! in (rupees). The backend stores them as unsigned integers, so there is no
//! fractional part to carry around.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Currency symbol used when rendering prices.
pub const CURRENCY_SYMBOL: &str = "₹";

/// Errors from parsing user-entered prices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PriceError {
    /// Input was empty or whitespace.
    #[error("price is empty")]
    Empty,
    /// Input was not a finite number.
    #[error("price is not a number: {0}")]
    NotANumber(String),
    /// Input was zero or negative after rounding.
    #[error("price must be positive")]
    NotPositive,
    /// Input does not fit into the backend's integer range.
    #[error("price is too large")]
    TooLarge,
}

/// A price in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    /// Create a new price from a raw unit amount.
    #[must_use]
    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    /// Get the amount in currency units.
    #[must_use]
    pub const fn amount(&self) -> u64 {
        self.0
    }

    /// Parse user input such as `"120"` or `"119.6"`.
    ///
    /// Decimal input is accepted and rounded to the nearest whole unit, the
    /// way the store's forms have always treated it.
    ///
    /// # Errors
    ///
    /// Returns `PriceError` when the input is empty, not a number, not
    /// positive after rounding, or out of range.
    pub fn parse_input(input: &str) -> Result<Self, PriceError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(PriceError::Empty);
        }

        let value: f64 = trimmed
            .parse()
            .map_err(|_| PriceError::NotANumber(trimmed.to_string()))?;
        if !value.is_finite() {
            return Err(PriceError::NotANumber(trimmed.to_string()));
        }
        if value <= 0.0 {
            return Err(PriceError::NotPositive);
        }

        let rounded = value.round();
        if rounded < 1.0 {
            return Err(PriceError::NotPositive);
        }
        #[allow(clippy::cast_precision_loss)] // Bound check only
        if rounded >= u64::MAX as f64 {
            return Err(PriceError::TooLarge);
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Checked above
        Ok(Self(rounded as u64))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CURRENCY_SYMBOL}{}", self.0)
    }
}

impl From<u64> for Price {
    fn from(amount: u64) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_input_whole_number() {
        assert_eq!(Price::parse_input("120"), Ok(Price::new(120)));
    }

    #[test]
    fn test_parse_input_rounds_decimals() {
        assert_eq!(Price::parse_input("119.6"), Ok(Price::new(120)));
        assert_eq!(Price::parse_input(" 45.49 "), Ok(Price::new(45)));
    }

    #[test]
    fn test_parse_input_rejects_empty() {
        assert_eq!(Price::parse_input("   "), Err(PriceError::Empty));
    }

    #[test]
    fn test_parse_input_rejects_non_numeric() {
        assert!(matches!(
            Price::parse_input("ten"),
            Err(PriceError::NotANumber(_))
        ));
        assert!(matches!(
            Price::parse_input("NaN"),
            Err(PriceError::NotANumber(_))
        ));
    }

    #[test]
    fn test_parse_input_rejects_non_positive() {
        assert_eq!(Price::parse_input("0"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse_input("-5"), Err(PriceError::NotPositive));
        assert_eq!(Price::parse_input("0.2"), Err(PriceError::NotPositive));
    }

    #[test]
    fn test_display_uses_rupee_sign() {
        assert_eq!(Price::new(180).to_string(), "₹180");
    }
}
