//! Error types for the instructor payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every condition that stops a calculation, a save or a payment.
//! Data-integrity problems that the engine can work around are not errors;
//! they are reported as [`AuditWarning`](crate::models::AuditWarning)s on the
//! breakdown instead.

use thiserror::Error;
use uuid::Uuid;

use crate::models::YearMonth;

/// Operator-facing validation failures.
///
/// These are raised before (or instead of) producing a figure and are never
/// retried by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required selection (instructor or month) was not supplied.
    #[error("Missing required selection: {field}")]
    MissingSelection {
        /// The name of the missing field.
        field: String,
    },

    /// An attendance-dependent pay model has no recorded hours or classes.
    #[error("No attendance recorded for {year_month} under pay model '{pay_model}'")]
    NoAttendance {
        /// The pay model that requires attendance.
        pay_model: String,
        /// The month that was requested.
        year_month: YearMonth,
    },

    /// The deduction would push the net salary below zero.
    #[error("Deduction {deduction} exceeds payable amount {payable}")]
    DeductionExceedsPay {
        /// The requested deduction.
        deduction: String,
        /// Gross salary minus withheld tax.
        payable: String,
    },

    /// An amount grew past what a decimal can hold.
    #[error("Amount overflow while computing {field}")]
    AmountOverflow {
        /// The figure being computed.
        field: String,
    },

    /// An update named no field to change.
    #[error("No fields to update on salary record {record_id}")]
    NoFieldsToUpdate {
        /// The record.
        record_id: Uuid,
    },

    /// A year-month value did not match `YYYY-MM`.
    #[error("Invalid year-month '{value}': expected YYYY-MM")]
    InvalidYearMonth {
        /// The rejected input.
        value: String,
    },

    /// A paid record cannot be recalculated or deleted.
    #[error("Salary record {record_id} is already paid")]
    RecordAlreadyPaid {
        /// The frozen record.
        record_id: Uuid,
    },

    /// A recalculation supplied a different instructor than the record's.
    #[error("Salary record {record_id} belongs to instructor '{expected}', not '{actual}'")]
    InstructorMismatch {
        /// The record being recalculated.
        record_id: Uuid,
        /// The instructor on the record.
        expected: String,
        /// The instructor supplied.
        actual: String,
    },

    /// A record for the same instructor and month already exists.
    #[error("Salary record for instructor '{instructor_id}' in {year_month} already exists")]
    DuplicateRecord {
        /// The instructor.
        instructor_id: String,
        /// The month.
        year_month: YearMonth,
    },
}

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use instructor_payroll::error::PayrollError;
///
/// let error = PayrollError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum PayrollError {
    /// The request was rejected before any figure was produced.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The work summary collaborator failed.
    #[error("Failed to aggregate attendance for instructor '{instructor_id}': {message}")]
    AggregationFailure {
        /// The instructor whose attendance was requested.
        instructor_id: String,
        /// What went wrong.
        message: String,
    },

    /// A record changed underneath the caller.
    #[error("Salary record {record_id} was modified concurrently (expected version {expected}, found {actual})")]
    PersistenceConflict {
        /// The contested record.
        record_id: Uuid,
        /// The version the caller last saw.
        expected: u64,
        /// The version currently stored.
        actual: u64,
    },

    /// No record exists with this id.
    #[error("Salary record not found: {record_id}")]
    RecordNotFound {
        /// The missing id.
        record_id: Uuid,
    },

    /// The record store could not be accessed.
    #[error("Salary store unavailable: {message}")]
    StoreUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// No tax rate table is effective for the requested month.
    #[error("No tax rates effective for {year_month}")]
    TaxRatesNotFound {
        /// The month that was requested.
        year_month: YearMonth,
    },
}

impl PayrollError {
    /// Returns true for failures the operator can fix by changing the request.
    pub fn is_validation(&self) -> bool {
        matches!(self, PayrollError::Validation(_))
    }
}

/// A type alias for Results that return PayrollError.
pub type PayrollResult<T> = Result<T, PayrollError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> YearMonth {
        YearMonth::new(2025, 3).unwrap()
    }

    #[test]
    fn test_config_not_found_displays_path() {
        let error = PayrollError::ConfigNotFound {
            path: "/missing/engine.yaml".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Configuration file not found: /missing/engine.yaml"
        );
    }

    #[test]
    fn test_no_attendance_displays_model_and_month() {
        let error: PayrollError = ValidationError::NoAttendance {
            pay_model: "hourly".to_string(),
            year_month: march(),
        }
        .into();
        assert_eq!(
            error.to_string(),
            "Validation failed: No attendance recorded for 2025-03 under pay model 'hourly'"
        );
        assert!(error.is_validation());
    }

    #[test]
    fn test_missing_selection_displays_field() {
        let error = ValidationError::MissingSelection {
            field: "instructor".to_string(),
        };
        assert_eq!(error.to_string(), "Missing required selection: instructor");
    }

    #[test]
    fn test_conflict_displays_versions() {
        let error = PayrollError::PersistenceConflict {
            record_id: Uuid::nil(),
            expected: 1,
            actual: 2,
        };
        assert_eq!(
            error.to_string(),
            "Salary record 00000000-0000-0000-0000-000000000000 was modified concurrently (expected version 1, found 2)"
        );
        assert!(!error.is_validation());
    }

    #[test]
    fn test_aggregation_failure_displays_instructor() {
        let error = PayrollError::AggregationFailure {
            instructor_id: "inst_7".to_string(),
            message: "timed out".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Failed to aggregate attendance for instructor 'inst_7': timed out"
        );
    }

    #[test]
    fn test_errors_implement_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<PayrollError>();
        assert_error::<ValidationError>();
    }

    #[test]
    fn test_error_propagation_with_question_mark() {
        fn rejects() -> Result<(), ValidationError> {
            Err(ValidationError::InvalidYearMonth {
                value: "2025/03".to_string(),
            })
        }

        fn propagates() -> PayrollResult<()> {
            rejects()?;
            Ok(())
        }

        assert!(matches!(
            propagates(),
            Err(PayrollError::Validation(ValidationError::InvalidYearMonth { .. }))
        ));
    }
}
