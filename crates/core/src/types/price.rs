//! Canonical money type.
//!
//! The document store holds price fields inconsistently as JSON strings or
//! numbers. `Price` canonicalizes both representations into decimal
//! arithmetic at the data-model boundary, so no call site ever parses a
//! price itself.

use core::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The input is not a decimal number.
    #[error("invalid price {0:?}")]
    Invalid(String),
    /// The price is negative.
    #[error("price cannot be negative: {0}")]
    Negative(Decimal),
}

/// A non-negative amount of money in the catalog's currency unit.
///
/// Deserializes from either a JSON string (`"120000"`) or a JSON number
/// (`120000`); always serializes as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a price from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        Ok(Self(amount))
    }

    /// Parse a price from its string representation.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Invalid`] if the input is not a decimal number,
    /// or [`PriceError::Negative`] if it is below zero.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount =
            Decimal::from_str(s.trim()).map_err(|_| PriceError::Invalid(s.to_owned()))?;
        Self::new(amount)
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Line total for `quantity` units at this price.
    #[must_use]
    pub fn total(&self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Sum of an iterator of prices.
    pub fn sum<I: IntoIterator<Item = Self>>(prices: I) -> Self {
        Self(prices.into_iter().map(|p| p.0).sum())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for Price {
    fn from(amount: u32) -> Self {
        Self(Decimal::from(amount))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        let raw = Raw::deserialize(deserializer)?;
        let s = match raw {
            Raw::Number(n) => n.to_string(),
            Raw::Text(s) => s,
        };
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_from_string() {
        let price: Price = serde_json::from_str("\"120000\"").unwrap();
        assert_eq!(price.amount(), Decimal::from(120_000));
    }

    #[test]
    fn test_deserialize_from_number() {
        let price: Price = serde_json::from_str("120000").unwrap();
        assert_eq!(price.amount(), Decimal::from(120_000));

        let price: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(price, Price::parse("19.99").unwrap());
    }

    #[test]
    fn test_deserialize_rejects_garbage() {
        assert!(serde_json::from_str::<Price>("\"twelve\"").is_err());
        assert!(serde_json::from_str::<Price>("\"-5\"").is_err());
    }

    #[test]
    fn test_serializes_as_string() {
        let price = Price::parse("120000").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "\"120000\"");
    }

    #[test]
    fn test_total() {
        let price = Price::parse("120000").unwrap();
        assert_eq!(price.total(3), Price::parse("360000").unwrap());
        assert_eq!(price.total(0), Price::ZERO);
    }

    #[test]
    fn test_sum() {
        let total = Price::sum([
            Price::parse("100").unwrap(),
            Price::parse("250.50").unwrap(),
        ]);
        assert_eq!(total, Price::parse("350.50").unwrap());
    }

    #[test]
    fn test_ordering() {
        assert!(Price::parse("100").unwrap() < Price::parse("200").unwrap());
    }
}
