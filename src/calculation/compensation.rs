//! Compensation calculation.
//!
//! This module ties the calculation rules together: it guards against empty
//! months, derives the base amount, adds the incentive, withholds tax and
//! subtracts the deduction. The result is a [`CompensationBreakdown`] with an
//! audit step for each stage.

use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{PayrollResult, ValidationError};
use crate::models::{
    Adjustments, AuditStep, AuditTrace, AuditWarning, CompensationBreakdown, CompensationProfile,
    PayModel, TaxRegime, WarningSeverity, WorkFacts, WorkSummary,
};

use super::{TaxRates, calculate_base_amount, check_attendance, round_currency, withhold};

/// Calculates an instructor's compensation for one month.
///
/// The calculation has no side effects and reads no clock, so identical inputs
/// always produce identical breakdowns.
///
/// Adjustments are clamped to zero and rounded before use. Warnings already
/// attached to the profile or the adjustments are copied into the audit trace.
///
/// # Errors
///
/// - [`ValidationError::NoAttendance`] when an attendance-dependent pay model
///   has no classes and no hours.
/// - [`ValidationError::DeductionExceedsPay`] when the deduction is larger
///   than gross minus tax. This is a local policy choice: the plain formula
///   would yield a negative `net_salary`, and this engine refuses to store one.
/// - [`ValidationError::AmountOverflow`] when a figure leaves `Decimal` range.
///   Amounts parsed through [`RawAmount::coerce`](crate::models::RawAmount::coerce)
///   are capped well below that, so this only arises for hand-built profiles.
///
/// # Examples
///
/// ```
/// use instructor_payroll::calculation::{TaxRates, calculate_compensation};
/// use instructor_payroll::models::{
///     Adjustments, CompensationProfile, PayModel, TaxRegime, WorkSummary, YearMonth,
/// };
/// use rust_decimal::Decimal;
///
/// let profile = CompensationProfile::new(
///     "inst_001",
///     PayModel::Monthly { base_salary: Decimal::from(1_000_000) },
///     TaxRegime::Flat33Percent,
/// );
/// let summary = WorkSummary::empty(YearMonth::new(2025, 3).unwrap());
///
/// let breakdown = calculate_compensation(
///     &profile,
///     &summary,
///     &Adjustments::none(),
///     &TaxRates::default(),
/// ).unwrap();
///
/// assert_eq!(breakdown.tax_amount, Decimal::from(33_000));
/// assert_eq!(breakdown.net_salary, Decimal::from(967_000));
/// ```
pub fn calculate_compensation(
    profile: &CompensationProfile,
    summary: &WorkSummary,
    adjustments: &Adjustments,
    rates: &TaxRates,
) -> PayrollResult<CompensationBreakdown> {
    let mut trace = AuditTrace::default();
    trace.warnings.extend(profile.warnings.iter().cloned());
    trace.warnings.extend(adjustments.warnings.iter().cloned());

    if let PayModel::Unknown { label, .. } = &profile.pay_model {
        if !trace.has_warning(AuditWarning::UNKNOWN_PAY_MODEL) {
            warn!(
                instructor_id = %profile.instructor_id,
                pay_model = %label,
                "Calculating with unrecognised pay model"
            );
            trace.warnings.push(AuditWarning::new(
                AuditWarning::UNKNOWN_PAY_MODEL,
                format!(
                    "Unrecognised pay model '{}'; using base salary or hourly rate",
                    label
                ),
                WarningSeverity::High,
            ));
        }
    }

    let guard_step = check_attendance(&profile.pay_model, summary, trace.next_step_number())?;
    trace.steps.push(guard_step);

    let base = calculate_base_amount(&profile.pay_model, summary, trace.next_step_number())?;
    let base_amount = base.base_amount;
    trace.steps.push(base.audit_step);

    settle(
        base_amount,
        profile.tax_regime,
        WorkFacts::from_summary(profile.pay_model.label(), summary),
        adjustments,
        rates,
        trace,
    )
}

/// Re-applies adjustments to an existing breakdown.
///
/// The base amount, work facts and the attendance and base audit steps are
/// kept; gross, tax and net are recomputed exactly as
/// [`calculate_compensation`] computes them, so the breakdown invariants hold.
/// Warnings from the previous breakdown are kept and new adjustment warnings
/// are appended.
///
/// # Errors
///
/// As for [`calculate_compensation`], except that attendance is not checked
/// again.
pub fn apply_adjustments(
    breakdown: &CompensationBreakdown,
    adjustments: &Adjustments,
    rates: &TaxRates,
) -> PayrollResult<CompensationBreakdown> {
    let mut trace = AuditTrace {
        steps: breakdown
            .audit_trace
            .steps
            .iter()
            .filter(|s| s.rule_id == "attendance_guard" || s.rule_id == "base_amount")
            .cloned()
            .collect(),
        warnings: breakdown.audit_trace.warnings.clone(),
    };
    trace.warnings.extend(adjustments.warnings.iter().cloned());

    settle(
        breakdown.base_amount,
        breakdown.tax_regime,
        breakdown.work_facts.clone(),
        adjustments,
        rates,
        trace,
    )
}

/// Gross, tax and net from a base amount.
fn settle(
    base_amount: Decimal,
    tax_regime: TaxRegime,
    work_facts: WorkFacts,
    adjustments: &Adjustments,
    rates: &TaxRates,
    mut trace: AuditTrace,
) -> PayrollResult<CompensationBreakdown> {
    let incentive_amount = round_currency(adjustments.incentive_amount.max(Decimal::ZERO));
    let total_deduction = round_currency(adjustments.deduction_amount.max(Decimal::ZERO));

    let gross_salary =
        base_amount
            .checked_add(incentive_amount)
            .ok_or_else(|| ValidationError::AmountOverflow {
                field: "gross_salary".to_string(),
            })?;
    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "base_amount": base_amount.to_string(),
            "incentive_amount": incentive_amount.to_string()
        }),
        output: serde_json::json!({ "gross_salary": gross_salary.to_string() }),
        reasoning: format!(
            "base {} + incentive {} = {}",
            base_amount, incentive_amount, gross_salary
        ),
    });

    let tax = withhold(gross_salary, tax_regime, rates, trace.next_step_number())?;
    let tax_amount = tax.withholding.total();
    trace.steps.push(tax.audit_step);

    // Both operands are non-negative, so neither subtraction can overflow.
    let payable = gross_salary - tax_amount;
    if total_deduction > payable {
        return Err(ValidationError::DeductionExceedsPay {
            deduction: total_deduction.to_string(),
            payable: payable.to_string(),
        }
        .into());
    }

    let net_salary = payable - total_deduction;
    trace.steps.push(AuditStep {
        step_number: trace.next_step_number(),
        rule_id: "net_salary".to_string(),
        rule_name: "Net Salary".to_string(),
        input: serde_json::json!({
            "gross_salary": gross_salary.to_string(),
            "tax_amount": tax_amount.to_string(),
            "deduction_amount": total_deduction.to_string()
        }),
        output: serde_json::json!({ "net_salary": net_salary.to_string() }),
        reasoning: format!(
            "gross {} - tax {} - deduction {} = {}",
            gross_salary, tax_amount, total_deduction, net_salary
        ),
    });

    Ok(CompensationBreakdown {
        base_amount,
        incentive_amount,
        gross_salary,
        tax_regime,
        tax_amount,
        insurance_component_breakdown: tax.withholding.itemized(),
        total_deduction,
        net_salary,
        work_facts,
        audit_trace: trace,
    })
}
