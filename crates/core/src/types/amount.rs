//! Monetary amount parsing.
//!
//! Prices arrive from Shopify as decimal strings (e.g. `"1999.6"`). Orders
//! are stored in whole currency units (yen has no minor unit), so parsing
//! rounds to the nearest whole unit - half away from zero, never truncation:
//! `"1999.6"` becomes `2000`, not `1999`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Errors produced by [`parse_amount`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    /// The input is not a decimal number.
    #[error("invalid amount: {0:?}")]
    Invalid(String),
    /// The rounded value does not fit in an `i64`.
    #[error("amount out of range: {0:?}")]
    OutOfRange(String),
}

/// Parse an upstream decimal price string into whole currency units.
///
/// # Errors
///
/// Returns [`AmountError::Invalid`] if the string is not a decimal number,
/// or [`AmountError::OutOfRange`] if the rounded value overflows `i64`.
pub fn parse_amount(s: &str) -> Result<i64, AmountError> {
    let decimal: Decimal = s
        .trim()
        .parse()
        .map_err(|_| AmountError::Invalid(s.to_owned()))?;

    decimal
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AmountError::OutOfRange(s.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_amounts() {
        assert_eq!(parse_amount("100.00"), Ok(100));
        assert_eq!(parse_amount("50.00"), Ok(50));
        assert_eq!(parse_amount("0"), Ok(0));
    }

    #[test]
    fn test_rounds_never_truncates() {
        assert_eq!(parse_amount("1999.6"), Ok(2000));
        assert_eq!(parse_amount("1999.4"), Ok(1999));
        // Midpoint rounds away from zero
        assert_eq!(parse_amount("1999.5"), Ok(2000));
    }

    #[test]
    fn test_whitespace_tolerated() {
        assert_eq!(parse_amount(" 120.0 "), Ok(120));
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(parse_amount("abc"), Err(AmountError::Invalid(_))));
        assert!(matches!(parse_amount(""), Err(AmountError::Invalid(_))));
    }
}
