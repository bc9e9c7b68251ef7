use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AmountError {
    #[error("Invalid amount: {0}")]
    Invalid(String),
}

/// Parse a monetary amount as it appears in bank exports: optional currency
/// symbol, thousands separators, and accounting-style parentheses for
/// negatives.
pub fn parse_amount(s: &str) -> Result<Decimal, AmountError> {
    let s = s.trim();
    let (negative, s) = if s.starts_with('(') && s.ends_with(')') {
        (true, &s[1..s.len() - 1])
    } else {
        (false, s)
    };
    let cleaned = s.replace([',', '$', ' '], "");
    let mut dec =
        Decimal::from_str(&cleaned).map_err(|_| AmountError::Invalid(cleaned.clone()))?;
    if negative {
        dec = -dec;
    }
    Ok(round_currency(dec))
}

/// Round to 2 decimal places, midpoint away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn parse_amount_plain() {
        assert_eq!(parse_amount("123.45").unwrap(), dec("123.45"));
    }

    #[test]
    fn parse_amount_with_dollar_sign() {
        assert_eq!(parse_amount("$99.99").unwrap(), dec("99.99"));
    }

    #[test]
    fn parse_amount_with_commas() {
        assert_eq!(parse_amount("1,234.56").unwrap(), dec("1234.56"));
    }

    #[test]
    fn parse_amount_negative() {
        assert_eq!(parse_amount("-50.00").unwrap(), dec("-50.00"));
    }

    #[test]
    fn parse_amount_accounting_parens() {
        assert_eq!(parse_amount("(75.25)").unwrap(), dec("-75.25"));
    }

    #[test]
    fn parse_amount_zero() {
        assert_eq!(parse_amount("0.00").unwrap(), Decimal::ZERO);
        assert_eq!(parse_amount("0").unwrap(), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_rounds_to_cents() {
        assert_eq!(parse_amount("10.005").unwrap(), dec("10.01"));
        assert_eq!(parse_amount("-10.005").unwrap(), dec("-10.01"));
    }

    #[test]
    fn parse_amount_invalid() {
        assert!(parse_amount("not_a_number").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn round_currency_standard() {
        assert_eq!(round_currency(dec("1.345")), dec("1.35"));
        assert_eq!(round_currency(dec("1.344")), dec("1.34"));
    }
}
