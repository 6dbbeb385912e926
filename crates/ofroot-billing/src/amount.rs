use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};

/// A major-unit amount as typed into a form: a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(Decimal),
    Text(String),
}

impl RawAmount {
    pub fn is_blank(&self) -> bool {
        matches!(self, RawAmount::Text(text) if text.trim().is_empty())
    }

    /// Parses the input; grouping commas are ignored. `None` for blank or
    /// non-numeric text.
    pub fn to_decimal(&self) -> Option<Decimal> {
        match self {
            RawAmount::Number(value) => Some(*value),
            RawAmount::Text(text) => {
                let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
                if cleaned.is_empty() {
                    return None;
                }
                Decimal::from_str(&cleaned)
                    .or_else(|_| Decimal::from_scientific(&cleaned))
                    .ok()
            }
        }
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        RawAmount::Number(value)
    }
}

impl From<i64> for RawAmount {
    fn from(value: i64) -> Self {
        RawAmount::Number(Decimal::from(value))
    }
}

impl From<i32> for RawAmount {
    fn from(value: i32) -> Self {
        RawAmount::Number(Decimal::from(value))
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

/// `round(amount * 100)`, half away from zero. `None` on overflow.
pub fn major_to_cents(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|cents| cents.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|cents| cents.to_i64())
}

pub(crate) fn round_to_i64(value: Decimal) -> i64 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(if value.is_sign_negative() { i64::MIN } else { i64::MAX })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_and_strings() {
        assert_eq!(RawAmount::from("12.34").to_decimal(), Some(Decimal::new(1234, 2)));
        assert_eq!(RawAmount::from(" 1,250.5 ").to_decimal(), Some(Decimal::new(12505, 1)));
        assert_eq!(RawAmount::from("1e2").to_decimal(), Some(Decimal::from(100)));
        assert_eq!(RawAmount::from(7).to_decimal(), Some(Decimal::from(7)));
        assert_eq!(RawAmount::from("ten").to_decimal(), None);
        assert_eq!(RawAmount::from("  ").to_decimal(), None);
        assert!(RawAmount::from("  ").is_blank());
    }

    #[test]
    fn deserializes_json_numbers_and_strings() {
        let number: RawAmount = serde_json::from_str("12.5").unwrap();
        let text: RawAmount = serde_json::from_str("\"abc\"").unwrap();

        assert_eq!(number.to_decimal(), Some(Decimal::new(125, 1)));
        assert_eq!(text.to_decimal(), None);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(major_to_cents(Decimal::new(1234, 2)), Some(1234));
        assert_eq!(major_to_cents(Decimal::new(10005, 4)), Some(100));
        assert_eq!(major_to_cents(Decimal::new(1005, 3)), Some(101));
        assert_eq!(major_to_cents(Decimal::new(-1005, 3)), Some(-101));
        assert_eq!(major_to_cents(Decimal::MAX), None);
    }
}
