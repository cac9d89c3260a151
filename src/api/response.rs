//! Response types for the payroll API.
//!
//! This module defines the error response structures and the mapping from
//! [`PayrollError`] to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, ValidationError};
use crate::models::{CompensationBreakdown, DeductionLine, SalaryRecord, YearMonth};
use crate::store::PaymentOutcome;

/// Response body for `POST /salaries/calculate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculationResponse {
    /// The instructor calculated for.
    pub instructor_id: String,
    /// The month calculated.
    pub year_month: YearMonth,
    /// Deduction lines in statement order.
    pub deduction_lines: Vec<DeductionLine>,
    /// The full breakdown.
    pub breakdown: CompensationBreakdown,
}

impl CalculationResponse {
    /// Wraps a breakdown.
    pub fn new(
        instructor_id: impl Into<String>,
        year_month: YearMonth,
        breakdown: CompensationBreakdown,
    ) -> Self {
        Self {
            instructor_id: instructor_id.into(),
            year_month,
            deduction_lines: breakdown.deduction_lines(),
            breakdown,
        }
    }
}

/// What `POST /salaries/{id}/pay` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentResult {
    /// The record was paid by this request.
    Paid,
    /// The record was already paid; nothing changed.
    AlreadyPaid,
}

/// Response body for `POST /salaries/{id}/pay`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResponse {
    /// What happened.
    pub result: PaymentResult,
    /// The record after the request.
    pub record: SalaryRecord,
}

impl From<PaymentOutcome> for PaymentResponse {
    fn from(outcome: PaymentOutcome) -> Self {
        match outcome {
            PaymentOutcome::Paid(record) => Self {
                result: PaymentResult::Paid,
                record,
            },
            PaymentOutcome::AlreadyPaid(record) => Self {
                result: PaymentResult::AlreadyPaid,
                record,
            },
        }
    }
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates a missing selection error response.
    pub fn missing_selection(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::with_details(
            "VALIDATION_ERROR",
            format!("Missing required selection: {}", field),
            format!("Select a value for '{}' before calculating", field),
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

fn validation_code(error: &ValidationError) -> &'static str {
    match error {
        ValidationError::NoAttendance { .. } => "NO_ATTENDANCE",
        ValidationError::DeductionExceedsPay { .. } => "DEDUCTION_EXCEEDS_PAY",
        ValidationError::RecordAlreadyPaid { .. } => "RECORD_ALREADY_PAID",
        ValidationError::DuplicateRecord { .. } => "DUPLICATE_RECORD",
        ValidationError::AmountOverflow { .. } => "AMOUNT_OVERFLOW",
        ValidationError::MissingSelection { .. }
        | ValidationError::InvalidYearMonth { .. }
        | ValidationError::InstructorMismatch { .. }
        | ValidationError::NoFieldsToUpdate { .. } => "VALIDATION_ERROR",
    }
}

impl From<PayrollError> for ApiErrorResponse {
    fn from(error: PayrollError) -> Self {
        match error {
            PayrollError::Validation(validation) => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::new(validation_code(&validation), validation.to_string()),
            },
            PayrollError::AggregationFailure {
                instructor_id,
                message,
            } => ApiErrorResponse {
                status: StatusCode::BAD_GATEWAY,
                error: ApiError::with_details(
                    "AGGREGATION_FAILURE",
                    format!("Failed to aggregate attendance for instructor '{}'", instructor_id),
                    message,
                ),
            },
            PayrollError::PersistenceConflict {
                record_id,
                expected,
                actual,
            } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "PERSISTENCE_CONFLICT",
                    format!("Salary record {} was modified concurrently", record_id),
                    format!("expected version {}, found {}", expected, actual),
                ),
            },
            PayrollError::RecordNotFound { record_id } => ApiErrorResponse {
                status: StatusCode::NOT_FOUND,
                error: ApiError::new(
                    "RECORD_NOT_FOUND",
                    format!("Salary record not found: {}", record_id),
                ),
            },
            PayrollError::StoreUnavailable { message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("STORE_UNAVAILABLE", "Salary store unavailable", message),
            },
            PayrollError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            PayrollError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            PayrollError::TaxRatesNotFound { year_month } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    format!("No tax rates effective for {}", year_month),
                    "Add a tax rate file effective on or before the first day of the month",
                ),
            },
        }
    }
}
