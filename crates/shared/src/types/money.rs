//! Transfer amounts with decimal precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Operator input is parsed straight into `rust_decimal::Decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Errors produced while parsing an operator-supplied amount.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmountParseError {
    /// Input is not a decimal number.
    #[error("Invalid amount '{0}': expected a decimal number")]
    Malformed(String),

    /// Amount is zero or negative.
    #[error("Amount must be positive, got {0}")]
    NotPositive(Decimal),
}

/// A strictly positive amount of value moved by one transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TransferAmount(Decimal);

impl TransferAmount {
    /// Creates a transfer amount, rejecting zero and negative values.
    pub fn new(amount: Decimal) -> Result<Self, AmountParseError> {
        if amount <= Decimal::ZERO {
            return Err(AmountParseError::NotPositive(amount));
        }
        Ok(Self(amount))
    }

    /// Parses operator input such as `"30"` or `"12.50"`.
    pub fn parse(input: &str) -> Result<Self, AmountParseError> {
        let trimmed = input.trim();
        let amount = Decimal::from_str(trimmed)
            .map_err(|_| AmountParseError::Malformed(input.to_string()))?;
        Self::new(amount)
    }

    /// Returns the amount as a decimal.
    #[must_use]
    pub const fn value(self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for TransferAmount {
    type Error = AmountParseError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

impl From<TransferAmount> for Decimal {
    fn from(amount: TransferAmount) -> Self {
        amount.0
    }
}

impl FromStr for TransferAmount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for TransferAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("30", dec!(30))]
    #[case("12.50", dec!(12.50))]
    #[case("  0.01 ", dec!(0.01))]
    fn test_parse_valid(#[case] input: &str, #[case] expected: Decimal) {
        assert_eq!(TransferAmount::parse(input).unwrap().value(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("ten")]
    #[case("1,000")]
    #[case("NaN")]
    fn test_parse_malformed(#[case] input: &str) {
        assert_eq!(
            TransferAmount::parse(input),
            Err(AmountParseError::Malformed(input.to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_zero_and_negative() {
        assert_eq!(
            TransferAmount::parse("0"),
            Err(AmountParseError::NotPositive(dec!(0)))
        );
        assert_eq!(
            TransferAmount::parse("-5"),
            Err(AmountParseError::NotPositive(dec!(-5)))
        );
    }

    #[test]
    fn test_serde_rejects_non_positive() {
        let ok: TransferAmount = serde_json::from_str("\"10.5\"").unwrap();
        assert_eq!(ok.value(), dec!(10.5));
        assert!(serde_json::from_str::<TransferAmount>("\"-1\"").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(TransferAmount::parse("7.25").unwrap().to_string(), "7.25");
    }
}
