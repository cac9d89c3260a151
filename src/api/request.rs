//! Request types for the payroll API.
//!
//! Bodies are deliberately lenient: the instructor and month are optional at
//! the JSON level so that a missing selection is reported as a validation
//! error rather than a deserialization failure, and adjustments accept
//! numbers or numeric strings.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attendance::AttendanceRecord;
use crate::error::{PayrollResult, ValidationError};
use crate::models::{
    Adjustments, AttendanceStatus, InstructorRecord, PaymentStatus, RawAmount, SalaryFilter,
    TimeSlot, YearMonth,
};
use crate::store::PaymentTarget;

/// Request body for `POST /salaries/calculate` and `POST /salaries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalculationRequest {
    /// The instructor row.
    #[serde(default)]
    pub instructor: Option<InstructorRecord>,
    /// The month, as `YYYY-MM`.
    #[serde(default)]
    pub year_month: Option<String>,
    /// The instructor's attendance entries.
    #[serde(default)]
    pub attendance: Vec<AttendanceEntryRequest>,
    /// Incentive added before tax.
    #[serde(default)]
    pub incentive_amount: RawAmount,
    /// Deduction subtracted after tax.
    #[serde(default)]
    pub deduction_amount: RawAmount,
}

impl CalculationRequest {
    /// The instructor, or `MissingSelection`.
    pub fn instructor(&self) -> PayrollResult<&InstructorRecord> {
        require_instructor(self.instructor.as_ref())
    }

    /// The parsed month, or `MissingSelection` / `InvalidYearMonth`.
    pub fn year_month(&self) -> PayrollResult<YearMonth> {
        require_year_month(self.year_month.as_deref())
    }

    /// The adjustments, with any parse warnings.
    pub fn adjustments(&self) -> Adjustments {
        Adjustments::from_raw(&self.incentive_amount, &self.deduction_amount)
    }

    /// The attendance entries tagged with `instructor_id`.
    pub fn attendance_records(&self, instructor_id: &str) -> Vec<AttendanceRecord> {
        to_records(&self.attendance, instructor_id)
    }
}

/// Request body for `POST /salaries/{id}/recalculate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecalculationRequest {
    /// The instructor's current row.
    #[serde(default)]
    pub instructor: Option<InstructorRecord>,
    /// The instructor's attendance entries.
    #[serde(default)]
    pub attendance: Vec<AttendanceEntryRequest>,
    /// Fail with a conflict unless the stored version matches.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl RecalculationRequest {
    /// The instructor, or `MissingSelection`.
    pub fn instructor(&self) -> PayrollResult<&InstructorRecord> {
        require_instructor(self.instructor.as_ref())
    }

    /// The attendance entries tagged with `instructor_id`.
    pub fn attendance_records(&self, instructor_id: &str) -> Vec<AttendanceRecord> {
        to_records(&self.attendance, instructor_id)
    }
}

fn require_year_month(raw: Option<&str>) -> PayrollResult<YearMonth> {
    match raw.map(str::trim) {
        None | Some("") => Err(ValidationError::MissingSelection {
            field: "year_month".to_string(),
        }
        .into()),
        Some(value) => Ok(value.parse::<YearMonth>()?),
    }
}

fn require_instructor(instructor: Option<&InstructorRecord>) -> PayrollResult<&InstructorRecord> {
    instructor.ok_or_else(|| {
        ValidationError::MissingSelection {
            field: "instructor".to_string(),
        }
        .into()
    })
}

fn to_records(entries: &[AttendanceEntryRequest], instructor_id: &str) -> Vec<AttendanceRecord> {
    entries
        .iter()
        .map(|e| AttendanceRecord {
            instructor_id: instructor_id.to_string(),
            work_date: e.work_date,
            time_slot: e.time_slot,
            status: e.status,
            check_in: e.check_in,
            check_out: e.check_out,
        })
        .collect()
}

/// One attendance entry in a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceEntryRequest {
    /// The day worked.
    #[serde(alias = "date")]
    pub work_date: NaiveDate,
    /// Which slot.
    pub time_slot: TimeSlot,
    /// The recorded status.
    pub status: AttendanceStatus,
    /// Check-in time.
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    /// Check-out time.
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
}

/// Request body for `POST /salaries/work-summary`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkSummaryRequest {
    /// The instructor.
    #[serde(default)]
    pub instructor_id: Option<String>,
    /// The month, as `YYYY-MM`.
    #[serde(default)]
    pub year_month: Option<String>,
    /// The instructor's attendance entries.
    #[serde(default)]
    pub attendance: Vec<AttendanceEntryRequest>,
}

impl WorkSummaryRequest {
    /// The instructor id, or `MissingSelection`.
    pub fn instructor_id(&self) -> PayrollResult<&str> {
        match self.instructor_id.as_deref().map(str::trim) {
            None | Some("") => Err(ValidationError::MissingSelection {
                field: "instructor_id".to_string(),
            }
            .into()),
            Some(id) => Ok(id),
        }
    }

    /// The parsed month, or `MissingSelection` / `InvalidYearMonth`.
    pub fn year_month(&self) -> PayrollResult<YearMonth> {
        require_year_month(self.year_month.as_deref())
    }

    /// The attendance entries tagged with `instructor_id`.
    pub fn attendance_records(&self, instructor_id: &str) -> Vec<AttendanceRecord> {
        to_records(&self.attendance, instructor_id)
    }
}

/// Request body for `PUT /salaries/{id}`.
///
/// Only the fields present are changed. `deduction_amount` is accepted as an
/// alias of `total_deduction`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjustmentUpdateRequest {
    /// New incentive, added before tax.
    #[serde(default)]
    pub incentive_amount: Option<RawAmount>,
    /// New deduction, subtracted after tax.
    #[serde(default, alias = "deduction_amount")]
    pub total_deduction: Option<RawAmount>,
    /// Fail with a conflict unless the stored version matches.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// Request body for `POST /salaries/{id}/pay`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentRequest {
    /// The payment date; today when omitted.
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
    /// Fail with a conflict unless the stored version matches.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

/// One entry of `salary_ids`: a bare id or an id with a version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulkPaymentItem {
    /// Pay unconditionally.
    Id(Uuid),
    /// Pay only if the version matches.
    Target(PaymentTarget),
}

impl From<BulkPaymentItem> for PaymentTarget {
    fn from(item: BulkPaymentItem) -> Self {
        match item {
            BulkPaymentItem::Id(id) => PaymentTarget::from(id),
            BulkPaymentItem::Target(target) => target,
        }
    }
}

/// Request body for `POST /salaries/bulk-pay`.
///
/// A non-empty `salary_ids` wins; otherwise `year_month` pays every unpaid
/// record of that month.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkPaymentRequest {
    /// The records to pay.
    #[serde(default)]
    pub salary_ids: Vec<BulkPaymentItem>,
    /// Pay every unpaid record of this month instead.
    #[serde(default)]
    pub year_month: Option<String>,
    /// The payment date; today when omitted.
    #[serde(default)]
    pub payment_date: Option<NaiveDate>,
}

/// Which records a bulk payment covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkSelection {
    /// Explicit records, in request order.
    Targets(Vec<PaymentTarget>),
    /// Every unpaid record of a month.
    Month(YearMonth),
}

impl BulkPaymentRequest {
    /// The payment targets in request order.
    pub fn targets(&self) -> Vec<PaymentTarget> {
        self.salary_ids.iter().copied().map(Into::into).collect()
    }

    /// The selection, or `MissingSelection` when neither ids nor a month
    /// were given.
    pub fn selection(&self) -> PayrollResult<BulkSelection> {
        if !self.salary_ids.is_empty() {
            return Ok(BulkSelection::Targets(self.targets()));
        }
        match self.year_month.as_deref().map(str::trim) {
            None | Some("") => Err(ValidationError::MissingSelection {
                field: "year_month or salary_ids".to_string(),
            }
            .into()),
            Some(value) => Ok(BulkSelection::Month(value.parse()?)),
        }
    }
}

/// Query string for `GET /salaries`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Only this instructor.
    #[serde(default)]
    pub instructor_id: Option<String>,
    /// Only this month.
    #[serde(default)]
    pub year_month: Option<String>,
    /// Only this status.
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

impl TryFrom<ListQuery> for SalaryFilter {
    type Error = ValidationError;

    fn try_from(query: ListQuery) -> Result<Self, Self::Error> {
        let year_month = query
            .year_month
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse::<YearMonth>())
            .transpose()?;
        Ok(SalaryFilter {
            instructor_id: query.instructor_id.filter(|s| !s.trim().is_empty()),
            year_month,
            payment_status: query.payment_status,
        })
    }
}

/// Query string for `DELETE /salaries/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeleteQuery {
    /// Fail with a conflict unless the stored version matches.
    #[serde(default)]
    pub expected_version: Option<u64>,
}
