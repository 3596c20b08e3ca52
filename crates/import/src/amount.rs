use rust_decimal::Decimal;
use std::str::FromStr;
use stmtnorm_core::{Money, NormalizeError};

use crate::util::{re, retain_chars};

re!(re_leading_number, r"^(?:\d+(?:\.\d+)?|\.\d+)");

/// Currency codes recognised inside amount tokens, in priority order.
pub const AMOUNT_CURRENCIES: [&str; 2] = ["EUR", "USD"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Debit,
    Credit,
}

/// An amount token split into direction, value and any embedded currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAmount {
    pub direction: Direction,
    pub value: Money,
    pub currency: Option<&'static str>,
}

impl ParsedAmount {
    /// The `(debit, credit)` column pair; the unused side is zero.
    pub fn columns(&self) -> (Money, Money) {
        match self.direction {
            Direction::Debit => (self.value, Money::zero()),
            Direction::Credit => (Money::zero(), self.value),
        }
    }
}

/// Parse a raw amount cell such as `"1,250.00 CR"` or `"EUR 30.00"`.
///
/// Any token containing `cr` (in any case) is a credit; everything else is a
/// debit. A value that cannot be read becomes zero.
pub fn parse_amount(raw: &str) -> ParsedAmount {
    let raw = raw.trim();
    let direction = if raw.to_lowercase().contains("cr") {
        Direction::Credit
    } else {
        Direction::Debit
    };

    let value = match amount_value(raw) {
        Ok(v) => v,
        Err(e) => {
            if !raw.is_empty() {
                tracing::warn!("{e}, using 0.00");
            }
            Money::zero()
        }
    };

    ParsedAmount {
        direction,
        value,
        currency: amount_currency(raw),
    }
}

/// Numeric value of an amount token: every character other than digits and
/// `.` is discarded and the leading number of what remains is used.
pub fn amount_value(raw: &str) -> Result<Money, NormalizeError> {
    let digits = retain_chars(raw, |c| c.is_ascii_digit() || c == '.');
    let number = re_leading_number()
        .find(&digits)
        .map(|m| m.as_str())
        .ok_or_else(|| NormalizeError::UnparseableAmount(raw.to_string()))?;
    let number = if number.starts_with('.') {
        format!("0{number}")
    } else {
        number.to_string()
    };
    let dec = Decimal::from_str(&number)
        .map_err(|_| NormalizeError::UnparseableAmount(raw.to_string()))?;
    Ok(Money::from_decimal(dec))
}

/// First currency code spelled out literally in the token.
pub fn amount_currency(raw: &str) -> Option<&'static str> {
    AMOUNT_CURRENCIES.into_iter().find(|code| raw.contains(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn money(s: &str) -> Money {
        Money::from_decimal(Decimal::from_str(s).unwrap())
    }

    // ── direction ─────────────────────────────────────────────────────────────

    #[test]
    fn plain_amount_is_debit() {
        let a = parse_amount("450.00");
        assert_eq!(a.direction, Direction::Debit);
        assert_eq!(a.columns(), (money("450.00"), Money::zero()));
    }

    #[test]
    fn cr_in_any_case_is_credit() {
        for raw in ["30.00 CR", "30.00cr", "Cr 30", "30.00 (Credit)"] {
            let a = parse_amount(raw);
            assert_eq!(a.direction, Direction::Credit, "{raw}");
            let (debit, credit) = a.columns();
            assert_eq!(debit, Money::zero());
            assert_eq!(credit, money("30.00"), "{raw}");
        }
    }

    #[test]
    fn dr_suffix_is_debit() {
        assert_eq!(parse_amount("99.10 DR").direction, Direction::Debit);
    }

    // ── value ─────────────────────────────────────────────────────────────────

    #[test]
    fn thousands_separators_and_symbols_are_dropped() {
        assert_eq!(amount_value("₹1,234.56").unwrap().to_string(), "1234.56");
        assert_eq!(amount_value("USD 1,000").unwrap().to_string(), "1000.00");
    }

    #[test]
    fn sign_is_ignored() {
        assert_eq!(amount_value("-50.00").unwrap().to_string(), "50.00");
    }

    #[test]
    fn second_decimal_point_ends_the_number() {
        assert_eq!(amount_value("12.50.3").unwrap().to_string(), "12.50");
        assert_eq!(amount_value(".5").unwrap().to_string(), "0.50");
    }

    #[test]
    fn rounding_to_two_places() {
        assert_eq!(amount_value("10.125").unwrap().to_string(), "10.13");
    }

    #[test]
    fn unreadable_value_defaults_to_zero() {
        assert!(matches!(
            amount_value("n/a"),
            Err(NormalizeError::UnparseableAmount(_))
        ));
        assert_eq!(parse_amount("n/a").value, Money::zero());
        assert_eq!(parse_amount("").columns(), (Money::zero(), Money::zero()));
    }

    // ── currency ──────────────────────────────────────────────────────────────

    #[test]
    fn currency_is_read_from_token() {
        assert_eq!(parse_amount("EUR 30.00").currency, Some("EUR"));
        assert_eq!(parse_amount("12.00 USD").currency, Some("USD"));
        assert_eq!(parse_amount("EUR/USD 1.00").currency, Some("EUR"));
        assert_eq!(parse_amount("12.00 usd").currency, None);
        assert_eq!(parse_amount("450.00").currency, None);
    }
}
