//! Attendance guard.
//!
//! Attendance-dependent pay models cannot produce a meaningful figure for a
//! month with no classes and no hours. Rather than silently paying zero, the
//! guard rejects the calculation so an operator can correct the attendance.

use crate::error::{PayrollResult, ValidationError};
use crate::models::{AuditStep, PayModel, WorkSummary};

/// Rejects an empty month for pay models that depend on attendance.
///
/// `monthly` is always allowed. An unknown model is guarded only when it will
/// fall back to the hourly formula.
///
/// # Errors
///
/// Returns [`ValidationError::NoAttendance`] when the model requires
/// attendance and the summary has zero classes and zero hours.
pub fn check_attendance(
    pay_model: &PayModel,
    summary: &WorkSummary,
    step_number: u32,
) -> PayrollResult<AuditStep> {
    let required = pay_model.requires_attendance();

    if required && summary.has_no_attendance() {
        return Err(ValidationError::NoAttendance {
            pay_model: pay_model.label().to_string(),
            year_month: summary.year_month,
        }
        .into());
    }

    let reasoning = if required {
        format!(
            "{} pay requires attendance; found {} classes and {} hours",
            pay_model.label(),
            summary.total_classes,
            summary.total_hours.normalize()
        )
    } else {
        format!("{} pay does not depend on attendance", pay_model.label())
    };

    Ok(AuditStep {
        step_number,
        rule_id: "attendance_guard".to_string(),
        rule_name: "Attendance Guard".to_string(),
        input: serde_json::json!({
            "pay_model": pay_model.label(),
            "year_month": summary.year_month.to_string(),
            "total_classes": summary.total_classes,
            "total_hours": summary.total_hours.to_string()
        }),
        output: serde_json::json!({
            "requires_attendance": required,
            "passed": true
        }),
        reasoning,
    })
}
