//! HTTP API module for the instructor payroll engine.
//!
//! This module provides the REST endpoints for calculating, saving,
//! recalculating and paying monthly instructor salaries.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{
    AdjustmentUpdateRequest, AttendanceEntryRequest, BulkPaymentItem, BulkPaymentRequest,
    BulkSelection, CalculationRequest, DeleteQuery, ListQuery, PaymentRequest,
    RecalculationRequest, WorkSummaryRequest,
};
pub use response::{
    ApiError, ApiErrorResponse, CalculationResponse, PaymentResponse, PaymentResult,
};
pub use state::AppState;
