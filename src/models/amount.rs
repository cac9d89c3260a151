//! Lenient parsing of stored monetary values.
//!
//! Instructor rates and adjustments are persisted as loosely typed values: a
//! JSON number, a numeric string such as `"15000.00"`, `null`, or occasionally
//! garbage. [`RawAmount`] holds such a value until the calculation boundary,
//! where [`RawAmount::coerce`] turns it into a non-negative [`Decimal`] exactly
//! once. Nothing past that boundary re-parses.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{AuditWarning, WarningSeverity};

/// The largest amount accepted from storage or a request: one trillion.
///
/// Anything larger is clamped by [`RawAmount::coerce`], which keeps every
/// product of a rate and a month of attendance well inside `Decimal` range.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// An amount as it arrived from storage or a request body.
///
/// # Example
///
/// ```
/// use instructor_payroll::models::RawAmount;
/// use rust_decimal::Decimal;
///
/// let mut warnings = Vec::new();
/// let rate: RawAmount = serde_json::from_str("\"15,000\"").unwrap();
/// assert_eq!(rate.coerce("hourly_rate", &mut warnings), Decimal::from(15000));
///
/// let broken: RawAmount = serde_json::from_str("\"n/a\"").unwrap();
/// assert_eq!(broken.coerce("base_salary", &mut warnings), Decimal::ZERO);
/// assert_eq!(warnings.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawAmount(serde_json::Value);

/// The outcome of reading a raw amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAmount {
    /// Nothing was stored.
    Missing,
    /// A decimal value (possibly negative).
    Value(Decimal),
    /// Something was stored but it is not a number.
    Unparseable(String),
}

impl RawAmount {
    /// Wraps an arbitrary JSON value.
    pub fn from_json(value: serde_json::Value) -> Self {
        Self(value)
    }

    /// An absent amount.
    pub fn missing() -> Self {
        Self(serde_json::Value::Null)
    }

    /// Reads the stored value without applying any policy.
    pub fn parse(&self) -> ParsedAmount {
        match &self.0 {
            serde_json::Value::Null => ParsedAmount::Missing,
            serde_json::Value::Number(n) => parse_decimal(&n.to_string())
                .map(ParsedAmount::Value)
                .unwrap_or_else(|| ParsedAmount::Unparseable(n.to_string())),
            serde_json::Value::String(s) if s.trim().is_empty() => ParsedAmount::Missing,
            serde_json::Value::String(s) => parse_decimal(s)
                .map(ParsedAmount::Value)
                .unwrap_or_else(|| ParsedAmount::Unparseable(s.clone())),
            other => ParsedAmount::Unparseable(other.to_string()),
        }
    }

    /// Converts to a non-negative decimal no larger than [`MAX_AMOUNT`].
    ///
    /// Missing values become zero silently. Unparsable text becomes zero,
    /// negative numbers are clamped to zero and oversized numbers are clamped
    /// to [`MAX_AMOUNT`]; each pushes a warning naming `field`.
    pub fn coerce(&self, field: &str, warnings: &mut Vec<AuditWarning>) -> Decimal {
        match self.parse() {
            ParsedAmount::Missing => Decimal::ZERO,
            ParsedAmount::Value(value) if value.is_sign_negative() && !value.is_zero() => {
                warn!(field, value = %value, "Negative amount clamped to zero");
                warnings.push(AuditWarning::new(
                    AuditWarning::NEGATIVE_AMOUNT,
                    format!("{} was {}; treated as 0", field, value),
                    WarningSeverity::Medium,
                ));
                Decimal::ZERO
            }
            ParsedAmount::Value(value) if value > MAX_AMOUNT => {
                warn!(field, value = %value, "Oversized amount clamped");
                warnings.push(AuditWarning::new(
                    AuditWarning::AMOUNT_OUT_OF_RANGE,
                    format!("{} was {}; treated as {}", field, value, MAX_AMOUNT),
                    WarningSeverity::High,
                ));
                MAX_AMOUNT
            }
            ParsedAmount::Value(value) => value,
            ParsedAmount::Unparseable(raw) => {
                warn!(field, raw = %raw, "Unparseable amount treated as zero");
                warnings.push(AuditWarning::new(
                    AuditWarning::UNPARSEABLE_AMOUNT,
                    format!("{} could not be read from {:?}; treated as 0", field, raw),
                    WarningSeverity::Medium,
                ));
                Decimal::ZERO
            }
        }
    }
}

impl From<Decimal> for RawAmount {
    fn from(value: Decimal) -> Self {
        Self(serde_json::Value::String(value.to_string()))
    }
}

impl From<i64> for RawAmount {
    fn from(value: i64) -> Self {
        Self(serde_json::Value::from(value))
    }
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        Self(serde_json::Value::String(value.to_string()))
    }
}

/// Parses a decimal string, tolerating surrounding whitespace, `,` thousands
/// separators and exponent notation.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn raw(json: &str) -> RawAmount {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_number_and_string_parse_alike() {
        let mut warnings = Vec::new();
        assert_eq!(raw("15000").coerce("rate", &mut warnings), dec("15000"));
        assert_eq!(raw("\"15000.00\"").coerce("rate", &mut warnings), dec("15000"));
        assert_eq!(raw("12.5").coerce("rate", &mut warnings), dec("12.5"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_thousands_separator_and_whitespace() {
        let mut warnings = Vec::new();
        assert_eq!(raw("\" 1,500,000 \"").coerce("salary", &mut warnings), dec("1500000"));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_null_and_blank_are_zero_without_warning() {
        let mut warnings = Vec::new();
        assert_eq!(raw("null").coerce("rate", &mut warnings), Decimal::ZERO);
        assert_eq!(raw("\"  \"").coerce("rate", &mut warnings), Decimal::ZERO);
        assert_eq!(RawAmount::default().coerce("rate", &mut warnings), Decimal::ZERO);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_garbage_is_zero_with_warning() {
        let mut warnings = Vec::new();
        assert_eq!(raw("\"abc\"").coerce("hourly_rate", &mut warnings), Decimal::ZERO);
        assert_eq!(raw("true").coerce("hourly_rate", &mut warnings), Decimal::ZERO);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.code == AuditWarning::UNPARSEABLE_AMOUNT));
        assert!(warnings[0].message.contains("hourly_rate"));
    }

    #[test]
    fn test_negative_is_clamped_with_warning() {
        let mut warnings = Vec::new();
        assert_eq!(raw("-500").coerce("incentive", &mut warnings), Decimal::ZERO);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, AuditWarning::NEGATIVE_AMOUNT);
    }

    #[test]
    fn test_negative_zero_is_not_flagged() {
        let mut warnings = Vec::new();
        assert_eq!(raw("\"-0\"").coerce("incentive", &mut warnings), Decimal::ZERO);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_max_amount_is_one_trillion() {
        assert_eq!(MAX_AMOUNT, dec("1000000000000"));
    }

    #[test]
    fn test_oversized_is_clamped_with_warning() {
        let mut warnings = Vec::new();
        let huge = raw("\"79228162514264337593543950335\"");
        assert_eq!(huge.coerce("hourly_rate", &mut warnings), MAX_AMOUNT);
        assert_eq!(raw("1000000000000").coerce("base_salary", &mut warnings), MAX_AMOUNT);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, AuditWarning::AMOUNT_OUT_OF_RANGE);
        assert!(warnings[0].message.contains("hourly_rate"));
    }

    #[test]
    fn test_scientific_notation() {
        assert_eq!(parse_decimal("1.5e4"), Some(dec("15000")));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(RawAmount::from(dec("10.5")).parse(), ParsedAmount::Value(dec("10.5")));
        assert_eq!(RawAmount::from(42).parse(), ParsedAmount::Value(dec("42")));
        assert_eq!(RawAmount::from("x").parse(), ParsedAmount::Unparseable("x".to_string()));
        assert_eq!(RawAmount::missing().parse(), ParsedAmount::Missing);
    }
}
