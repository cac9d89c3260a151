//! Calculation logic for the instructor payroll engine.
//!
//! This module contains the pure calculation rules: currency rounding, the
//! attendance guard, base amount by pay model, tax and insurance withholding,
//! and [`calculate_compensation`] which runs them in order.

mod attendance_guard;
mod base_amount;
mod compensation;
mod rounding;
mod tax;

pub use attendance_guard::check_attendance;
pub use base_amount::{BaseAmountResult, calculate_base_amount, slot_pay};
pub use compensation::{apply_adjustments, calculate_compensation};
pub use rounding::{round_currency, round_hours};
pub use tax::{
    EMPLOYMENT_INSURANCE_RATE, FLAT_WITHHOLDING_RATE, HEALTH_INSURANCE_RATE, LONG_TERM_CARE_RATE,
    NATIONAL_PENSION_RATE, StatutoryRates, TaxRates, WithholdingResult, statutory_components,
    withhold,
};
