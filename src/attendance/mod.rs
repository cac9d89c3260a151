//! Attendance aggregation.
//!
//! The calculator never reads raw attendance. It receives a [`WorkSummary`]
//! built by a [`WorkSummaryAggregator`]; [`AttendanceLedger`] is the in-memory
//! implementation used by the service and the HTTP API.

mod ledger;

pub use ledger::{AttendanceLedger, AttendanceRecord, summarize};

use crate::error::PayrollResult;
use crate::models::{WorkSummary, YearMonth};

/// Builds the monthly work summary for an instructor.
///
/// Implementations may be backed by anything (a database, a remote service);
/// failures are reported as `AggregationFailure`.
pub trait WorkSummaryAggregator: Send + Sync {
    /// Summarises `instructor_id`'s counted attendance in `year_month`.
    fn work_summary(&self, instructor_id: &str, year_month: YearMonth)
    -> PayrollResult<WorkSummary>;
}
