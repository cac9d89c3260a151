//! Tax and social insurance withholding.
//!
//! This module maps a gross amount and a [`TaxRegime`] to the amount withheld.
//! The statutory regime is itemised into four independently rounded
//! components; the withheld total is always the sum of the rounded components.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollResult, ValidationError};
use crate::models::{AuditStep, InsuranceComponents, TaxRegime, TaxWithholding};

use super::round_currency;

/// Flat freelance withholding rate (3.3%).
pub const FLAT_WITHHOLDING_RATE: Decimal = Decimal::from_parts(33, 0, 0, false, 3);

/// Employee share of the national pension (4.5%).
pub const NATIONAL_PENSION_RATE: Decimal = Decimal::from_parts(45, 0, 0, false, 3);

/// Employee share of health insurance (3.545%).
pub const HEALTH_INSURANCE_RATE: Decimal = Decimal::from_parts(3545, 0, 0, false, 5);

/// Long-term-care insurance as a share of the health insurance component (12.95%).
pub const LONG_TERM_CARE_RATE: Decimal = Decimal::from_parts(1295, 0, 0, false, 4);

/// Employee share of employment insurance (0.9%).
pub const EMPLOYMENT_INSURANCE_RATE: Decimal = Decimal::from_parts(9, 0, 0, false, 3);

/// Statutory insurance rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatutoryRates {
    /// Applied to gross.
    pub national_pension: Decimal,
    /// Applied to gross.
    pub health_insurance: Decimal,
    /// Applied to the rounded health insurance component.
    pub long_term_care: Decimal,
    /// Applied to gross.
    pub employment_insurance: Decimal,
}

impl Default for StatutoryRates {
    fn default() -> Self {
        Self {
            national_pension: NATIONAL_PENSION_RATE,
            health_insurance: HEALTH_INSURANCE_RATE,
            long_term_care: LONG_TERM_CARE_RATE,
            employment_insurance: EMPLOYMENT_INSURANCE_RATE,
        }
    }
}

/// The full rate table used by [`withhold`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    /// Rate for [`TaxRegime::Flat33Percent`].
    pub flat_rate: Decimal,
    /// Rates for [`TaxRegime::StatutoryInsurance`].
    pub statutory: StatutoryRates,
}

impl Default for TaxRates {
    fn default() -> Self {
        Self {
            flat_rate: FLAT_WITHHOLDING_RATE,
            statutory: StatutoryRates::default(),
        }
    }
}

/// The result of a withholding computation, including the audit step.
#[derive(Debug, Clone)]
pub struct WithholdingResult {
    /// What is withheld.
    pub withholding: TaxWithholding,
    /// The audit step recording this computation.
    pub audit_step: AuditStep,
}

/// Computes the statutory insurance components for `gross`.
///
/// Pension, health and employment insurance are rates on gross. Long-term care
/// is a rate on the already rounded health insurance component. Each component
/// is rounded on its own.
///
/// Returns `None` if any component, or their total, overflows.
pub fn statutory_components(gross: Decimal, rates: &StatutoryRates) -> Option<InsuranceComponents> {
    let health_insurance = round_currency(gross.checked_mul(rates.health_insurance)?);
    let components = InsuranceComponents {
        national_pension: round_currency(gross.checked_mul(rates.national_pension)?),
        health_insurance,
        long_term_care: round_currency(health_insurance.checked_mul(rates.long_term_care)?),
        employment_insurance: round_currency(gross.checked_mul(rates.employment_insurance)?),
    };
    components
        .national_pension
        .checked_add(components.health_insurance)?
        .checked_add(components.long_term_care)?
        .checked_add(components.employment_insurance)?;
    Some(components)
}

fn overflow() -> ValidationError {
    ValidationError::AmountOverflow {
        field: "tax_amount".to_string(),
    }
}

/// Computes what is withheld from `gross` under `regime`.
///
/// # Errors
///
/// [`ValidationError::AmountOverflow`] when a rate applied to `gross` leaves
/// `Decimal` range.
///
/// # Examples
///
/// ```
/// use instructor_payroll::calculation::{TaxRates, withhold};
/// use instructor_payroll::models::TaxRegime;
/// use rust_decimal::Decimal;
///
/// let result = withhold(Decimal::from(1_000_000), TaxRegime::Flat33Percent, &TaxRates::default(), 1).unwrap();
/// assert_eq!(result.withholding.total(), Decimal::from(33_000));
///
/// let result = withhold(Decimal::from(1_000_000), TaxRegime::StatutoryInsurance, &TaxRates::default(), 1).unwrap();
/// let components = result.withholding.itemized().unwrap();
/// assert_eq!(components.total(), result.withholding.total());
/// ```
pub fn withhold(
    gross: Decimal,
    regime: TaxRegime,
    rates: &TaxRates,
    step_number: u32,
) -> PayrollResult<WithholdingResult> {
    let (withholding, reasoning, output) = match regime {
        TaxRegime::None => (
            TaxWithholding::Flat {
                amount: Decimal::ZERO,
            },
            "No withholding under regime 'none'".to_string(),
            serde_json::json!({ "tax_amount": "0" }),
        ),
        TaxRegime::Flat33Percent => {
            let amount = round_currency(gross.checked_mul(rates.flat_rate).ok_or_else(overflow)?);
            (
                TaxWithholding::Flat { amount },
                format!(
                    "{} x {} = {} (rounded)",
                    gross.normalize(),
                    rates.flat_rate.normalize(),
                    amount
                ),
                serde_json::json!({ "tax_amount": amount.to_string() }),
            )
        }
        TaxRegime::StatutoryInsurance => {
            let c = statutory_components(gross, &rates.statutory).ok_or_else(overflow)?;
            (
                TaxWithholding::Itemized(c),
                format!(
                    "pension {} + health {} + long-term care {} + employment {} = {}",
                    c.national_pension,
                    c.health_insurance,
                    c.long_term_care,
                    c.employment_insurance,
                    c.total()
                ),
                serde_json::json!({
                    "national_pension": c.national_pension.to_string(),
                    "health_insurance": c.health_insurance.to_string(),
                    "long_term_care": c.long_term_care.to_string(),
                    "employment_insurance": c.employment_insurance.to_string(),
                    "tax_amount": c.total().to_string()
                }),
            )
        }
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "tax_withholding".to_string(),
        rule_name: "Tax Withholding".to_string(),
        input: serde_json::json!({
            "gross_salary": gross.to_string(),
            "tax_regime": regime.as_str()
        }),
        output,
        reasoning,
    };

    Ok(WithholdingResult {
        withholding,
        audit_step,
    })
}
