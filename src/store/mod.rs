//! Salary record persistence.
//!
//! The [`SalaryStore`] trait is the seam between the payroll service and
//! wherever records live. Status changes are conditional: a record only moves
//! from unpaid to paid, and callers may pass the version they last read so a
//! concurrent change is reported instead of overwritten.

mod memory;

pub use memory::InMemorySalaryStore;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PayrollResult;
use crate::models::{CompensationBreakdown, SalaryFilter, SalaryRecord, SalarySummary, YearMonth};

/// What a single mark-paid call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The record moved from unpaid to paid.
    Paid(SalaryRecord),
    /// The record was already paid and was left untouched.
    AlreadyPaid(SalaryRecord),
}

impl PaymentOutcome {
    /// The record after the call.
    pub fn record(&self) -> &SalaryRecord {
        match self {
            PaymentOutcome::Paid(record) | PaymentOutcome::AlreadyPaid(record) => record,
        }
    }

    /// Consumes the outcome, returning the record.
    pub fn into_record(self) -> SalaryRecord {
        match self {
            PaymentOutcome::Paid(record) | PaymentOutcome::AlreadyPaid(record) => record,
        }
    }
}

/// One record to pay, optionally guarded by the version the caller last saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentTarget {
    /// The record to pay.
    pub record_id: Uuid,
    /// Fail with a conflict unless the stored version matches.
    #[serde(default)]
    pub expected_version: Option<u64>,
}

impl From<Uuid> for PaymentTarget {
    fn from(record_id: Uuid) -> Self {
        Self {
            record_id,
            expected_version: None,
        }
    }
}

/// Why one record of a bulk payment was not paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "code", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkFailureReason {
    /// No record has this id.
    NotFound,
    /// The stored version differs from the one supplied.
    VersionConflict {
        /// The version supplied.
        expected: u64,
        /// The version stored.
        actual: u64,
    },
}

/// A record a bulk payment could not pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkPaymentFailure {
    /// The record.
    pub record_id: Uuid,
    /// Why it failed.
    pub reason: BulkFailureReason,
}

/// The per-record result of a bulk payment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkPaymentOutcome {
    /// Records moved from unpaid to paid.
    pub succeeded: Vec<Uuid>,
    /// Records already paid, left untouched.
    pub skipped: Vec<Uuid>,
    /// Records that could not be paid.
    pub failed: Vec<BulkPaymentFailure>,
}

/// Storage for salary records.
pub trait SalaryStore: Send + Sync {
    /// Saves a new record.
    ///
    /// Fails with `DuplicateRecord` when the instructor already has a record
    /// for the month.
    fn insert(&self, record: SalaryRecord) -> PayrollResult<SalaryRecord>;

    /// Fetches a record.
    fn get(&self, record_id: Uuid) -> PayrollResult<SalaryRecord>;

    /// Lists records matching `filter`, newest month first.
    fn list(&self, filter: &SalaryFilter) -> PayrollResult<Vec<SalaryRecord>>;

    /// Replaces the breakdown of an unpaid record.
    ///
    /// Fails with `RecordAlreadyPaid` for a paid record and
    /// `PersistenceConflict` when `expected_version` is stale.
    fn replace_breakdown(
        &self,
        record_id: Uuid,
        expected_version: Option<u64>,
        breakdown: CompensationBreakdown,
    ) -> PayrollResult<SalaryRecord>;

    /// Marks a record paid on `payment_date`.
    ///
    /// Paying an already paid record is a no-op that keeps its original
    /// payment date.
    fn mark_paid(
        &self,
        target: PaymentTarget,
        payment_date: NaiveDate,
    ) -> PayrollResult<PaymentOutcome>;

    /// Marks many records paid as one operation.
    ///
    /// Per-record problems are reported in the outcome rather than aborting
    /// the batch. Duplicate ids are processed once.
    fn bulk_mark_paid(
        &self,
        targets: &[PaymentTarget],
        payment_date: NaiveDate,
    ) -> PayrollResult<BulkPaymentOutcome>;

    /// Marks every unpaid record of `year_month` paid as one operation.
    ///
    /// Records are paid in instructor order; a month with nothing unpaid
    /// gives an empty outcome.
    fn mark_month_paid(
        &self,
        year_month: YearMonth,
        payment_date: NaiveDate,
    ) -> PayrollResult<BulkPaymentOutcome>;

    /// Deletes an unpaid record, returning it.
    fn delete(&self, record_id: Uuid, expected_version: Option<u64>)
    -> PayrollResult<SalaryRecord>;

    /// Totals for one month.
    fn summary(&self, year_month: YearMonth) -> PayrollResult<SalarySummary>;
}
