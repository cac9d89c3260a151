//! Compensation breakdown models.
//!
//! This module contains the [`CompensationBreakdown`] type and its associated
//! structures. The breakdown is the unit persisted as a salary record and the
//! only input a statement renderer needs: every itemised figure is carried
//! verbatim so nothing downstream recomputes it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AuditTrace, AuditWarning, RawAmount, TaxRegime, WorkSummary};

/// Manual adjustments supplied by the operator for one calculation.
///
/// # Example
///
/// ```
/// use instructor_payroll::models::{Adjustments, RawAmount};
/// use rust_decimal::Decimal;
///
/// let adjustments = Adjustments::from_raw(&RawAmount::from("50000"), &RawAmount::from(-10));
/// assert_eq!(adjustments.incentive_amount, Decimal::from(50000));
/// assert_eq!(adjustments.deduction_amount, Decimal::ZERO);
/// assert_eq!(adjustments.warnings.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjustments {
    /// Added before tax.
    pub incentive_amount: Decimal,
    /// Subtracted after tax.
    pub deduction_amount: Decimal,
    /// Problems found while parsing the raw values.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AuditWarning>,
}

impl Adjustments {
    /// Adjustments from typed values.
    pub fn new(incentive_amount: Decimal, deduction_amount: Decimal) -> Self {
        Self {
            incentive_amount,
            deduction_amount,
            warnings: Vec::new(),
        }
    }

    /// No incentive and no deduction.
    pub fn none() -> Self {
        Self::default()
    }

    /// Parses raw request or storage values into non-negative amounts.
    pub fn from_raw(incentive: &RawAmount, deduction: &RawAmount) -> Self {
        let mut warnings = Vec::new();
        let incentive_amount = incentive.coerce("incentive_amount", &mut warnings);
        let deduction_amount = deduction.coerce("deduction_amount", &mut warnings);
        Self {
            incentive_amount,
            deduction_amount,
            warnings,
        }
    }
}

/// The four itemised statutory insurance deductions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceComponents {
    /// National pension.
    pub national_pension: Decimal,
    /// Health insurance.
    pub health_insurance: Decimal,
    /// Long-term-care insurance, derived from the health insurance component.
    pub long_term_care: Decimal,
    /// Employment insurance.
    pub employment_insurance: Decimal,
}

impl InsuranceComponents {
    /// Sum of the four components.
    pub fn total(&self) -> Decimal {
        self.national_pension + self.health_insurance + self.long_term_care + self.employment_insurance
    }
}

/// The amount withheld from gross pay.
///
/// Flat regimes produce a single figure; the statutory regime keeps its
/// components so they can be shown line by line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaxWithholding {
    /// A single-line deduction (including zero).
    Flat {
        /// The withheld amount.
        amount: Decimal,
    },
    /// Itemised statutory insurance.
    Itemized(InsuranceComponents),
}

impl TaxWithholding {
    /// The total withheld, whatever the regime.
    pub fn total(&self) -> Decimal {
        match self {
            TaxWithholding::Flat { amount } => *amount,
            TaxWithholding::Itemized(components) => components.total(),
        }
    }

    /// The itemised components, when the regime has them.
    pub fn itemized(&self) -> Option<InsuranceComponents> {
        match self {
            TaxWithholding::Flat { .. } => None,
            TaxWithholding::Itemized(components) => Some(*components),
        }
    }
}

/// The attendance facts a breakdown was computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkFacts {
    /// The pay model label.
    pub pay_model: String,
    /// Hours worked.
    pub total_hours: Decimal,
    /// Classes taught.
    pub total_classes: u32,
    /// Morning classes.
    pub morning_classes: u32,
    /// Afternoon classes.
    pub afternoon_classes: u32,
    /// Evening classes.
    pub evening_classes: u32,
    /// Distinct days worked.
    pub attendance_days: u32,
}

impl WorkFacts {
    /// Echoes a work summary under the given pay model label.
    pub fn from_summary(pay_model: impl Into<String>, summary: &WorkSummary) -> Self {
        Self {
            pay_model: pay_model.into(),
            total_hours: summary.total_hours,
            total_classes: summary.total_classes,
            morning_classes: summary.morning_classes,
            afternoon_classes: summary.afternoon_classes,
            evening_classes: summary.evening_classes,
            attendance_days: summary.attendance_days,
        }
    }
}

/// A labelled deduction line as a statement shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionLine {
    /// Stable identifier for the line.
    pub code: String,
    /// Display label.
    pub label: String,
    /// The deducted amount.
    pub amount: Decimal,
}

/// The full result of one compensation calculation.
///
/// Invariants: `gross_salary = base_amount + incentive_amount` and
/// `net_salary = gross_salary - tax_amount - total_deduction`; every monetary
/// field is a non-negative whole number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationBreakdown {
    /// Pay derived from the pay model.
    pub base_amount: Decimal,
    /// Operator incentive, added pre-tax.
    pub incentive_amount: Decimal,
    /// Base plus incentive.
    pub gross_salary: Decimal,
    /// The regime tax was withheld under.
    pub tax_regime: TaxRegime,
    /// Total withheld.
    pub tax_amount: Decimal,
    /// Itemised components; present only for statutory insurance.
    pub insurance_component_breakdown: Option<InsuranceComponents>,
    /// Operator deduction, subtracted post-tax.
    pub total_deduction: Decimal,
    /// What the instructor is paid.
    pub net_salary: Decimal,
    /// The attendance facts used.
    pub work_facts: WorkFacts,
    /// How each figure was reached.
    pub audit_trace: AuditTrace,
}

impl CompensationBreakdown {
    /// Rebuilds the withholding sum type from the stored fields.
    pub fn withholding(&self) -> TaxWithholding {
        match self.insurance_component_breakdown {
            Some(components) => TaxWithholding::Itemized(components),
            None => TaxWithholding::Flat {
                amount: self.tax_amount,
            },
        }
    }

    /// The deduction lines a statement prints, in display order.
    ///
    /// Statutory insurance expands to one line per component; the other regimes
    /// print a single tax line. The operator deduction follows when non-zero.
    pub fn deduction_lines(&self) -> Vec<DeductionLine> {
        let mut lines = match self.withholding() {
            TaxWithholding::Itemized(c) => vec![
                line("national_pension", "National pension", c.national_pension),
                line("health_insurance", "Health insurance", c.health_insurance),
                line("long_term_care", "Long-term care insurance", c.long_term_care),
                line(
                    "employment_insurance",
                    "Employment insurance",
                    c.employment_insurance,
                ),
            ],
            TaxWithholding::Flat { amount } => match self.tax_regime {
                TaxRegime::Flat33Percent => vec![line("withholding_tax", "Withholding tax (3.3%)", amount)],
                _ if amount.is_zero() => vec![],
                _ => vec![line("withholding_tax", "Withholding tax", amount)],
            },
        };

        if !self.total_deduction.is_zero() {
            lines.push(line("deduction", "Deduction", self.total_deduction));
        }
        lines
    }

    /// Checks the gross and net invariants.
    pub fn is_consistent(&self) -> bool {
        self.gross_salary == self.base_amount + self.incentive_amount
            && self.net_salary == self.gross_salary - self.tax_amount - self.total_deduction
            && self.withholding().total() == self.tax_amount
    }
}

fn line(code: &str, label: &str, amount: Decimal) -> DeductionLine {
    DeductionLine {
        code: code.to_string(),
        label: label.to_string(),
        amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn facts() -> WorkFacts {
        WorkFacts {
            pay_model: "hourly".to_string(),
            total_hours: dec("10"),
            total_classes: 4,
            morning_classes: 2,
            afternoon_classes: 1,
            evening_classes: 1,
            attendance_days: 3,
        }
    }

    fn components() -> InsuranceComponents {
        InsuranceComponents {
            national_pension: dec("45000"),
            health_insurance: dec("35450"),
            long_term_care: dec("4591"),
            employment_insurance: dec("9000"),
        }
    }

    fn breakdown(regime: TaxRegime, withholding: TaxWithholding, deduction: &str) -> CompensationBreakdown {
        let gross = dec("1000000");
        let tax = withholding.total();
        let deduction = dec(deduction);
        CompensationBreakdown {
            base_amount: gross,
            incentive_amount: Decimal::ZERO,
            gross_salary: gross,
            tax_regime: regime,
            tax_amount: tax,
            insurance_component_breakdown: withholding.itemized(),
            total_deduction: deduction,
            net_salary: gross - tax - deduction,
            work_facts: facts(),
            audit_trace: AuditTrace::default(),
        }
    }

    #[test]
    fn test_insurance_total_is_sum_of_components() {
        assert_eq!(components().total(), dec("94041"));
    }

    #[test]
    fn test_withholding_total_and_itemized() {
        let flat = TaxWithholding::Flat { amount: dec("33000") };
        assert_eq!(flat.total(), dec("33000"));
        assert!(flat.itemized().is_none());

        let itemized = TaxWithholding::Itemized(components());
        assert_eq!(itemized.total(), dec("94041"));
        assert_eq!(itemized.itemized(), Some(components()));
    }

    #[test]
    fn test_statutory_breakdown_lists_each_component() {
        let b = breakdown(
            TaxRegime::StatutoryInsurance,
            TaxWithholding::Itemized(components()),
            "0",
        );
        let codes: Vec<String> = b.deduction_lines().into_iter().map(|l| l.code).collect();
        assert_eq!(
            codes,
            vec![
                "national_pension",
                "health_insurance",
                "long_term_care",
                "employment_insurance"
            ]
        );
        assert!(b.is_consistent());
    }

    #[test]
    fn test_flat_breakdown_has_single_tax_line_and_deduction() {
        let b = breakdown(
            TaxRegime::Flat33Percent,
            TaxWithholding::Flat { amount: dec("33000") },
            "5000",
        );
        let lines = b.deduction_lines();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].amount, dec("33000"));
        assert_eq!(lines[1].code, "deduction");
        assert_eq!(b.withholding(), TaxWithholding::Flat { amount: dec("33000") });
    }

    #[test]
    fn test_untaxed_breakdown_without_deduction_has_no_lines() {
        let b = breakdown(TaxRegime::None, TaxWithholding::Flat { amount: Decimal::ZERO }, "0");
        assert!(b.deduction_lines().is_empty());
    }

    #[test]
    fn test_inconsistent_breakdown_detected() {
        let mut b = breakdown(TaxRegime::None, TaxWithholding::Flat { amount: Decimal::ZERO }, "0");
        b.net_salary += Decimal::ONE;
        assert!(!b.is_consistent());
    }

    #[test]
    fn test_breakdown_serialization_carries_itemized_fields() {
        let b = breakdown(
            TaxRegime::StatutoryInsurance,
            TaxWithholding::Itemized(components()),
            "0",
        );
        let json = serde_json::to_value(&b).unwrap();
        assert_eq!(json["tax_regime"], "statutory_insurance");
        assert_eq!(json["tax_amount"], "94041");
        assert_eq!(json["insurance_component_breakdown"]["long_term_care"], "4591");
        assert_eq!(json["work_facts"]["pay_model"], "hourly");

        let flat = breakdown(TaxRegime::None, TaxWithholding::Flat { amount: Decimal::ZERO }, "0");
        let json = serde_json::to_value(&flat).unwrap();
        assert!(json["insurance_component_breakdown"].is_null());
    }

    #[test]
    fn test_adjustments_from_raw() {
        let adjustments = Adjustments::from_raw(&RawAmount::from("100000"), &RawAmount::from("oops"));
        assert_eq!(adjustments.incentive_amount, dec("100000"));
        assert_eq!(adjustments.deduction_amount, Decimal::ZERO);
        assert_eq!(adjustments.warnings[0].code, AuditWarning::UNPARSEABLE_AMOUNT);
    }
}
