//! Non-negative product price using decimal arithmetic.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input could not be parsed as a decimal.
    #[error("invalid price: {0}")]
    Invalid(String),
}

/// A product price in the store's currency.
///
/// Stored as a `NUMERIC(10, 2)` column and serialized to clients as a JSON
/// number (`999.99`), matching what catalog consumers expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount.round_dp(2)))
    }

    /// Get the decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|e| PriceError::Invalid(e.to_string()))?;
        Self::new(amount)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rejects_negative() {
        let err = "-0.01".parse::<Price>().expect_err("negative");
        assert!(matches!(err, PriceError::Negative(_)));
    }

    #[test]
    fn test_price_accepts_zero() {
        assert_eq!("0".parse::<Price>(), Ok(Price::ZERO));
    }

    #[test]
    fn test_price_display_two_decimals() {
        let price: Price = "999.99".parse().expect("valid");
        assert_eq!(price.to_string(), "999.99");

        let whole: Price = "59".parse().expect("valid");
        assert_eq!(whole.to_string(), "59.00");
    }

    #[test]
    fn test_price_serializes_as_number() {
        let price: Price = "1199.99".parse().expect("valid");
        let json = serde_json::to_string(&price).expect("serialize");
        assert_eq!(json, "1199.99");
    }

    #[test]
    fn test_price_rejects_garbage() {
        assert!(matches!("abc".parse::<Price>(), Err(PriceError::Invalid(_))));
    }
}
