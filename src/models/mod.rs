//! Core data models for the instructor payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod amount;
mod audit;
mod breakdown;
mod profile;
mod salary_record;
mod work_summary;
mod year_month;

pub use amount::{MAX_AMOUNT, ParsedAmount, RawAmount, parse_decimal};
pub use audit::{AuditStep, AuditTrace, AuditWarning, WarningSeverity};
pub use breakdown::{
    Adjustments, CompensationBreakdown, DeductionLine, InsuranceComponents, TaxWithholding,
    WorkFacts,
};
pub use profile::{CompensationProfile, InstructorRecord, PayModel, SlotRates, TaxRegime};
pub use salary_record::{PaymentStatus, SalaryFilter, SalaryRecord, SalarySummary};
pub use work_summary::{AttendanceStatus, SlotAttendance, TimeSlot, WorkSummary};
pub use year_month::YearMonth;
