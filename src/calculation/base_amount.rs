//! Base amount calculation.
//!
//! This module derives an instructor's base pay for a month from their
//! [`PayModel`] and [`WorkSummary`]. Every pay model is handled in a single
//! exhaustive match so that a new model cannot be added without a formula.

use rust_decimal::Decimal;

use crate::error::{PayrollResult, ValidationError};
use crate::models::{AuditStep, PayModel, SlotRates, TimeSlot, WorkSummary};

use super::round_currency;

/// The result of a base amount calculation, including the audit step.
#[derive(Debug, Clone)]
pub struct BaseAmountResult {
    /// The base amount, rounded to whole currency units.
    pub base_amount: Decimal,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Sum of `rate × classes` across the three slots, or `None` on overflow.
pub fn slot_pay(rates: &SlotRates, summary: &WorkSummary) -> Option<Decimal> {
    let morning = rates
        .morning
        .checked_mul(Decimal::from(summary.classes_in(TimeSlot::Morning)))?;
    let afternoon = rates
        .afternoon
        .checked_mul(Decimal::from(summary.classes_in(TimeSlot::Afternoon)))?;
    let evening = rates
        .evening
        .checked_mul(Decimal::from(summary.classes_in(TimeSlot::Evening)))?;
    morning.checked_add(afternoon)?.checked_add(evening)
}

/// Calculates the base amount for a month.
///
/// | Pay model | Formula |
/// |---|---|
/// | hourly | `hourly_rate × total_hours` |
/// | per_class | `Σ slot_rate × slot_classes`, or `hourly_rate × total_classes` when that sum is zero |
/// | monthly | `base_salary` |
/// | mixed | `base_salary + Σ slot_rate × slot_classes` |
/// | unknown | `base_salary` when positive, else `hourly_rate × total_hours` |
///
/// The per-class fallback applies only when the slot sum is exactly zero and
/// the hourly rate is positive.
///
/// # Errors
///
/// [`ValidationError::AmountOverflow`] when the formula leaves `Decimal` range.
///
/// # Examples
///
/// ```
/// use instructor_payroll::calculation::calculate_base_amount;
/// use instructor_payroll::models::{PayModel, WorkSummary, YearMonth};
/// use rust_decimal::Decimal;
///
/// let mut summary = WorkSummary::empty(YearMonth::new(2025, 3).unwrap());
/// summary.total_hours = Decimal::from(10);
///
/// let model = PayModel::Hourly { hourly_rate: Decimal::from(20000) };
/// let result = calculate_base_amount(&model, &summary, 2).unwrap();
/// assert_eq!(result.base_amount, Decimal::from(200000));
/// ```
pub fn calculate_base_amount(
    pay_model: &PayModel,
    summary: &WorkSummary,
    step_number: u32,
) -> PayrollResult<BaseAmountResult> {
    let (raw, formula, input) = match pay_model {
        PayModel::Hourly { hourly_rate } => (
            hourly_rate.checked_mul(summary.total_hours),
            format!(
                "hourly_rate {} x total_hours {}",
                hourly_rate.normalize(),
                summary.total_hours.normalize()
            ),
            serde_json::json!({
                "hourly_rate": hourly_rate.to_string(),
                "total_hours": summary.total_hours.to_string()
            }),
        ),
        PayModel::PerClass { rates, hourly_rate } => {
            let by_slot = slot_pay(rates, summary);
            let input = serde_json::json!({
                "rates": slot_rates_json(rates),
                "classes": slot_classes_json(summary),
                "hourly_rate": hourly_rate.to_string()
            });
            if by_slot.is_some_and(|v| v.is_zero()) && *hourly_rate > Decimal::ZERO {
                (
                    hourly_rate.checked_mul(Decimal::from(summary.total_classes)),
                    format!(
                        "slot rates sum to zero; fallback hourly_rate {} x total_classes {}",
                        hourly_rate.normalize(),
                        summary.total_classes
                    ),
                    input,
                )
            } else {
                (
                    by_slot,
                    format!(
                        "morning {} x {} + afternoon {} x {} + evening {} x {}",
                        rates.morning.normalize(),
                        summary.morning_classes,
                        rates.afternoon.normalize(),
                        summary.afternoon_classes,
                        rates.evening.normalize(),
                        summary.evening_classes
                    ),
                    input,
                )
            }
        }
        PayModel::Monthly { base_salary } => (
            Some(*base_salary),
            format!("fixed base_salary {}", base_salary.normalize()),
            serde_json::json!({ "base_salary": base_salary.to_string() }),
        ),
        PayModel::Mixed { base_salary, rates } => (
            slot_pay(rates, summary).and_then(|pay| base_salary.checked_add(pay)),
            format!(
                "base_salary {} + morning {} x {} + afternoon {} x {} + evening {} x {}",
                base_salary.normalize(),
                rates.morning.normalize(),
                summary.morning_classes,
                rates.afternoon.normalize(),
                summary.afternoon_classes,
                rates.evening.normalize(),
                summary.evening_classes
            ),
            serde_json::json!({
                "base_salary": base_salary.to_string(),
                "rates": slot_rates_json(rates),
                "classes": slot_classes_json(summary)
            }),
        ),
        PayModel::Unknown {
            label,
            base_salary,
            hourly_rate,
        } => {
            let input = serde_json::json!({
                "label": label,
                "base_salary": base_salary.to_string(),
                "hourly_rate": hourly_rate.to_string(),
                "total_hours": summary.total_hours.to_string()
            });
            if *base_salary > Decimal::ZERO {
                (
                    Some(*base_salary),
                    format!(
                        "unrecognised pay model '{}'; using base_salary {}",
                        label,
                        base_salary.normalize()
                    ),
                    input,
                )
            } else {
                (
                    hourly_rate.checked_mul(summary.total_hours),
                    format!(
                        "unrecognised pay model '{}'; using hourly_rate {} x total_hours {}",
                        label,
                        hourly_rate.normalize(),
                        summary.total_hours.normalize()
                    ),
                    input,
                )
            }
        }
    };

    let raw = raw.ok_or_else(|| ValidationError::AmountOverflow {
        field: "base_amount".to_string(),
    })?;
    let base_amount = round_currency(raw);

    let audit_step = AuditStep {
        step_number,
        rule_id: "base_amount".to_string(),
        rule_name: "Base Amount".to_string(),
        input,
        output: serde_json::json!({
            "pay_model": pay_model.label(),
            "base_amount": base_amount.to_string()
        }),
        reasoning: format!("{} = {}", formula, base_amount),
    };

    Ok(BaseAmountResult {
        base_amount,
        audit_step,
    })
}

fn slot_rates_json(rates: &SlotRates) -> serde_json::Value {
    serde_json::json!({
        "morning": rates.morning.to_string(),
        "afternoon": rates.afternoon.to_string(),
        "evening": rates.evening.to_string()
    })
}

fn slot_classes_json(summary: &WorkSummary) -> serde_json::Value {
    serde_json::json!({
        "morning": summary.morning_classes,
        "afternoon": summary.afternoon_classes,
        "evening": summary.evening_classes
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearMonth;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn summary(hours: &str, morning: u32, afternoon: u32, evening: u32) -> WorkSummary {
        let mut summary = WorkSummary::empty(YearMonth::new(2025, 3).unwrap());
        summary.total_hours = dec(hours);
        summary.morning_classes = morning;
        summary.afternoon_classes = afternoon;
        summary.evening_classes = evening;
        summary.total_classes = morning + afternoon + evening;
        summary
    }

    fn rates(morning: &str, afternoon: &str, evening: &str) -> SlotRates {
        SlotRates {
            morning: dec(morning),
            afternoon: dec(afternoon),
            evening: dec(evening),
        }
    }

    #[test]
    fn test_hourly() {
        let model = PayModel::Hourly {
            hourly_rate: dec("20000"),
        };
        let result = calculate_base_amount(&model, &summary("10", 0, 0, 0), 2).unwrap();
        assert_eq!(result.base_amount, dec("200000"));
        assert_eq!(result.audit_step.rule_id, "base_amount");
        assert_eq!(result.audit_step.step_number, 2);
        assert_eq!(result.audit_step.output["base_amount"], "200000");
    }

    #[test]
    fn test_hourly_fractional_hours_round_half_up() {
        // 15000 x 2.83 = 42450; 333 x 1.5 = 499.5
        let model = PayModel::Hourly {
            hourly_rate: dec("15000"),
        };
        let result = calculate_base_amount(&model, &summary("2.83", 0, 0, 0), 1).unwrap();
        assert_eq!(result.base_amount, dec("42450"));

        let model = PayModel::Hourly {
            hourly_rate: dec("333"),
        };
        let result = calculate_base_amount(&model, &summary("1.5", 0, 0, 0), 1).unwrap();
        assert_eq!(result.base_amount, dec("500"));
    }

    #[test]
    fn test_per_class_slot_rates() {
        let model = PayModel::PerClass {
            rates: rates("10000", "12000", "15000"),
            hourly_rate: dec("99999"),
        };
        let result = calculate_base_amount(&model, &summary("0", 2, 3, 1), 1).unwrap();
        assert_eq!(result.base_amount, dec("71000"));
        assert!(!result.audit_step.reasoning.contains("fallback"));
    }

    #[test]
    fn test_per_class_falls_back_to_hourly_rate() {
        let model = PayModel::PerClass {
            rates: SlotRates::default(),
            hourly_rate: dec("15000"),
        };
        let result = calculate_base_amount(&model, &summary("0", 3, 3, 2), 1).unwrap();
        assert_eq!(result.base_amount, dec("120000"));
        assert!(result.audit_step.reasoning.contains("fallback"));
    }

    #[test]
    fn test_per_class_no_fallback_when_classes_only_in_unrated_slot() {
        // Rated slot has no classes, so slot pay is zero and the fallback applies.
        let model = PayModel::PerClass {
            rates: rates("10000", "0", "0"),
            hourly_rate: dec("5000"),
        };
        let result = calculate_base_amount(&model, &summary("0", 0, 2, 0), 1).unwrap();
        assert_eq!(result.base_amount, dec("10000"));
    }

    #[test]
    fn test_per_class_zero_everything_is_zero() {
        let model = PayModel::PerClass {
            rates: SlotRates::default(),
            hourly_rate: Decimal::ZERO,
        };
        let result = calculate_base_amount(&model, &summary("0", 2, 0, 0), 1).unwrap();
        assert_eq!(result.base_amount, Decimal::ZERO);
    }

    #[test]
    fn test_monthly_ignores_attendance() {
        let model = PayModel::Monthly {
            base_salary: dec("2000000"),
        };
        let none = calculate_base_amount(&model, &summary("0", 0, 0, 0), 1).unwrap();
        let lots = calculate_base_amount(&model, &summary("80", 10, 10, 10), 1).unwrap();
        assert_eq!(none.base_amount, dec("2000000"));
        assert_eq!(lots.base_amount, dec("2000000"));
    }

    #[test]
    fn test_mixed_adds_slot_pay_to_base_salary() {
        let model = PayModel::Mixed {
            base_salary: dec("1000000"),
            rates: rates("10000", "12000", "15000"),
        };
        let result = calculate_base_amount(&model, &summary("0", 2, 3, 1), 1).unwrap();
        assert_eq!(result.base_amount, dec("1071000"));
    }

    #[test]
    fn test_mixed_has_no_hourly_fallback() {
        let model = PayModel::Mixed {
            base_salary: dec("500000"),
            rates: SlotRates::default(),
        };
        let result = calculate_base_amount(&model, &summary("12", 4, 0, 0), 1).unwrap();
        assert_eq!(result.base_amount, dec("500000"));
    }

    #[test]
    fn test_unknown_prefers_positive_base_salary() {
        let model = PayModel::Unknown {
            label: "weekly".to_string(),
            base_salary: dec("800000"),
            hourly_rate: dec("20000"),
        };
        let result = calculate_base_amount(&model, &summary("10", 0, 0, 0), 1).unwrap();
        assert_eq!(result.base_amount, dec("800000"));
        assert_eq!(result.audit_step.output["pay_model"], "weekly");
    }

    #[test]
    fn test_unknown_falls_back_to_hours() {
        let model = PayModel::Unknown {
            label: "weekly".to_string(),
            base_salary: Decimal::ZERO,
            hourly_rate: dec("20000"),
        };
        let result = calculate_base_amount(&model, &summary("10", 0, 0, 0), 1).unwrap();
        assert_eq!(result.base_amount, dec("200000"));
    }

    #[test]
    fn test_overflow_is_an_error_not_a_panic() {
        let model = PayModel::Hourly {
            hourly_rate: Decimal::MAX,
        };
        let result = calculate_base_amount(&model, &summary("3", 1, 0, 0), 1);
        assert!(matches!(
            result,
            Err(crate::error::PayrollError::Validation(ValidationError::AmountOverflow { .. }))
        ));

        let model = PayModel::Mixed {
            base_salary: Decimal::MAX,
            rates: rates("10000", "0", "0"),
        };
        assert!(calculate_base_amount(&model, &summary("0", 1, 0, 0), 1).is_err());
    }

    #[test]
    fn test_slot_pay_overflow_is_none() {
        let rates = SlotRates {
            morning: Decimal::MAX,
            ..SlotRates::default()
        };
        assert_eq!(slot_pay(&rates, &summary("0", 2, 0, 0)), None);
        assert_eq!(slot_pay(&rates, &summary("0", 0, 2, 0)), Some(Decimal::ZERO));
    }
}
