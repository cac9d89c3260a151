//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::AttendanceLedger;
use crate::error::{PayrollError, PayrollResult};
use crate::models::{SalaryFilter, SalaryRecord, YearMonth};
use crate::store::PaymentTarget;

use super::request::{
    AdjustmentUpdateRequest, BulkPaymentRequest, BulkSelection, CalculationRequest, DeleteQuery,
    ListQuery, PaymentRequest, RecalculationRequest, WorkSummaryRequest,
};
use super::response::{ApiError, ApiErrorResponse, CalculationResponse, PaymentResponse};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/salaries", get(list_handler).post(save_handler))
        .route("/salaries/calculate", post(calculate_handler))
        .route("/salaries/bulk-pay", post(bulk_pay_handler))
        .route("/salaries/work-summary", post(work_summary_handler))
        .route("/salaries/summary/:year_month", get(summary_handler))
        .route(
            "/salaries/:id",
            get(get_handler)
                .put(update_handler)
                .delete(delete_handler),
        )
        .route("/salaries/:id/recalculate", post(recalculate_handler))
        .route("/salaries/:id/pay", post(pay_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: PayrollError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, api_error.error)
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn parse_record_id(raw: &str) -> Result<Uuid, ApiErrorResponse> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiErrorResponse::bad_request(ApiError::validation_error(format!(
            "Invalid salary record id: {}",
            raw
        )))
    })
}

fn payment_date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Utc::now().date_naive())
}

/// Runs a calculation request against the request's own attendance.
fn run_calculation(
    state: &AppState,
    request: &CalculationRequest,
) -> PayrollResult<(CalculationResponse, YearMonth)> {
    let instructor = request.instructor()?;
    let year_month = request.year_month()?;
    let ledger = AttendanceLedger::from_records(
        state.config().attendance().clone(),
        request.attendance_records(&instructor.id),
    );
    let breakdown =
        state
            .service()
            .calculate(&ledger, instructor, year_month, &request.adjustments())?;
    Ok((
        CalculationResponse::new(instructor.id.clone(), year_month, breakdown),
        year_month,
    ))
}

/// Runs a save request against the request's own attendance.
fn run_save(state: &AppState, request: &CalculationRequest) -> PayrollResult<SalaryRecord> {
    let instructor = request.instructor()?;
    let year_month = request.year_month()?;
    let ledger = AttendanceLedger::from_records(
        state.config().attendance().clone(),
        request.attendance_records(&instructor.id),
    );
    state
        .service()
        .calculate_and_save(&ledger, instructor, year_month, &request.adjustments())
}

/// Handler for POST /salaries/calculate.
///
/// Returns the breakdown without saving it.
async fn calculate_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing calculation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    match run_calculation(&state, &request) {
        Ok((response, year_month)) => {
            info!(
                correlation_id = %correlation_id,
                instructor_id = %response.instructor_id,
                year_month = %year_month,
                net_salary = %response.breakdown.net_salary,
                duration_us = start_time.elapsed().as_micros(),
                "Calculation completed successfully"
            );
            json_response(StatusCode::OK, response)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /salaries/work-summary.
///
/// Returns the attendance facts a calculation would use.
async fn work_summary_handler(
    State(state): State<AppState>,
    payload: Result<Json<WorkSummaryRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let result = request.instructor_id().and_then(|instructor_id| {
        let year_month = request.year_month()?;
        let ledger = AttendanceLedger::from_records(
            state.config().attendance().clone(),
            request.attendance_records(instructor_id),
        );
        state
            .service()
            .work_summary(&ledger, instructor_id, year_month)
    });

    match result {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /salaries.
///
/// Calculates and saves a new unpaid record.
async fn save_handler(
    State(state): State<AppState>,
    payload: Result<Json<CalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing save request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match run_save(&state, &request) {
        Ok(record) => {
            info!(
                correlation_id = %correlation_id,
                record_id = %record.id,
                "Salary record created"
            );
            json_response(StatusCode::CREATED, record)
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /salaries.
async fn list_handler(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let query = match query {
        Ok(Query(q)) => q,
        Err(rejection) => {
            warn!(correlation_id = %correlation_id, error = %rejection, "Invalid query string");
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            );
        }
    };

    let result = SalaryFilter::try_from(query)
        .map_err(PayrollError::from)
        .and_then(|filter| state.service().list(&filter));

    match result {
        Ok(records) => json_response(StatusCode::OK, records),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /salaries/summary/{year_month}.
async fn summary_handler(
    State(state): State<AppState>,
    Path(year_month): Path<String>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let result = year_month
        .parse::<YearMonth>()
        .map_err(PayrollError::from)
        .and_then(|ym| state.service().summary(ym));

    match result {
        Ok(summary) => json_response(StatusCode::OK, summary),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /salaries/{id}.
async fn get_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let correlation_id = Uuid::new_v4();

    let record_id = match parse_record_id(&id) {
        Ok(record_id) => record_id,
        Err(response) => return response.into_response(),
    };

    match state.service().get(record_id) {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for PUT /salaries/{id}.
///
/// Changes the incentive and/or deduction of an unpaid record.
async fn update_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<AdjustmentUpdateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing adjustment update");

    let record_id = match parse_record_id(&id) {
        Ok(record_id) => record_id,
        Err(response) => return response.into_response(),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    match state.service().update_adjustments(
        record_id,
        request.expected_version,
        request.incentive_amount.as_ref(),
        request.total_deduction.as_ref(),
    ) {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for DELETE /salaries/{id}.
async fn delete_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    query: Option<Query<DeleteQuery>>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let record_id = match parse_record_id(&id) {
        Ok(record_id) => record_id,
        Err(response) => return response.into_response(),
    };
    let expected_version = query.and_then(|Query(q)| q.expected_version);

    match state.service().delete(record_id, expected_version) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /salaries/{id}/recalculate.
///
/// Recomputes an unpaid record from the supplied profile and attendance.
async fn recalculate_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<RecalculationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, record_id = %id, "Processing recalculation request");

    let record_id = match parse_record_id(&id) {
        Ok(record_id) => record_id,
        Err(response) => return response.into_response(),
    };
    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let result = request.instructor().and_then(|instructor| {
        let ledger = AttendanceLedger::from_records(
            state.config().attendance().clone(),
            request.attendance_records(&instructor.id),
        );
        state
            .service()
            .recalculate(&ledger, record_id, request.expected_version, instructor)
    });

    match result {
        Ok(record) => json_response(StatusCode::OK, record),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /salaries/{id}/pay.
///
/// Paying an already paid record returns 200 with `already_paid` and leaves
/// the record untouched.
async fn pay_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<PaymentRequest>>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let record_id = match parse_record_id(&id) {
        Ok(record_id) => record_id,
        Err(response) => return response.into_response(),
    };
    let request = payload.map(|Json(req)| req).unwrap_or_default();

    let target = PaymentTarget {
        record_id,
        expected_version: request.expected_version,
    };
    match state
        .service()
        .mark_paid(target, payment_date_or_today(request.payment_date))
    {
        Ok(outcome) => json_response(StatusCode::OK, PaymentResponse::from(outcome)),
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for POST /salaries/bulk-pay.
async fn bulk_pay_handler(
    State(state): State<AppState>,
    payload: Result<Json<BulkPaymentRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let payment_date = payment_date_or_today(request.payment_date);
    let result = request.selection().and_then(|selection| match selection {
        BulkSelection::Targets(targets) => {
            info!(
                correlation_id = %correlation_id,
                records = targets.len(),
                "Processing bulk payment request"
            );
            state.service().bulk_mark_paid(&targets, payment_date)
        }
        BulkSelection::Month(year_month) => {
            info!(
                correlation_id = %correlation_id,
                year_month = %year_month,
                "Processing month payment request"
            );
            state.service().mark_month_paid(year_month, payment_date)
        }
    });

    match result {
        Ok(outcome) => json_response(StatusCode::OK, outcome),
        Err(err) => error_response(correlation_id, err),
    }
}
