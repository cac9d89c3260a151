//! Monthly work summary models.
//!
//! A [`WorkSummary`] is the aggregated attendance for one instructor over one
//! month. The calculator trusts it as given; the aggregator that builds it is
//! responsible for keeping slot totals and the daily breakdown consistent.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::YearMonth;

/// The three daily teaching slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    /// Morning classes.
    Morning,
    /// Afternoon classes.
    Afternoon,
    /// Evening classes.
    Evening,
}

/// Attendance status of an instructor for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// Checked in on time.
    Present,
    /// Checked in late.
    Late,
    /// Worked part of the slot.
    HalfDay,
    /// Did not work.
    Absent,
    /// Absence approved in advance.
    Excused,
}

/// A single slot worked on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAttendance {
    /// Which slot.
    pub time_slot: TimeSlot,
    /// The recorded status.
    pub status: AttendanceStatus,
    /// Check-in time, if recorded.
    #[serde(default)]
    pub check_in: Option<NaiveTime>,
    /// Check-out time, if recorded.
    #[serde(default)]
    pub check_out: Option<NaiveTime>,
}

/// Aggregated attendance facts for one instructor over one month.
///
/// # Example
///
/// ```
/// use instructor_payroll::models::{WorkSummary, YearMonth};
/// use rust_decimal::Decimal;
///
/// let summary = WorkSummary::empty(YearMonth::new(2025, 3).unwrap());
/// assert!(summary.has_no_attendance());
/// assert_eq!(summary.total_hours, Decimal::ZERO);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSummary {
    /// The month summarised.
    pub year_month: YearMonth,
    /// Number of distinct days with counted attendance.
    pub attendance_days: u32,
    /// Hours worked, rounded to two decimal places.
    pub total_hours: Decimal,
    /// Total classes taught.
    pub total_classes: u32,
    /// Morning classes taught.
    pub morning_classes: u32,
    /// Afternoon classes taught.
    pub afternoon_classes: u32,
    /// Evening classes taught.
    pub evening_classes: u32,
    /// Counted slot attendance by date.
    #[serde(default)]
    pub daily_breakdown: BTreeMap<NaiveDate, Vec<SlotAttendance>>,
}

impl WorkSummary {
    /// A summary with no attendance at all.
    pub fn empty(year_month: YearMonth) -> Self {
        Self {
            year_month,
            attendance_days: 0,
            total_hours: Decimal::ZERO,
            total_classes: 0,
            morning_classes: 0,
            afternoon_classes: 0,
            evening_classes: 0,
            daily_breakdown: BTreeMap::new(),
        }
    }

    /// True when neither classes nor hours were recorded.
    pub fn has_no_attendance(&self) -> bool {
        self.total_classes == 0 && self.total_hours.is_zero()
    }

    /// Number of classes taught in `slot`.
    pub fn classes_in(&self, slot: TimeSlot) -> u32 {
        match slot {
            TimeSlot::Morning => self.morning_classes,
            TimeSlot::Afternoon => self.afternoon_classes,
            TimeSlot::Evening => self.evening_classes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_summary_has_no_attendance() {
        let summary = WorkSummary::empty(YearMonth::new(2025, 1).unwrap());
        assert!(summary.has_no_attendance());
        assert_eq!(summary.attendance_days, 0);
        assert!(summary.daily_breakdown.is_empty());
    }

    #[test]
    fn test_hours_alone_count_as_attendance() {
        let mut summary = WorkSummary::empty(YearMonth::new(2025, 1).unwrap());
        summary.total_hours = Decimal::new(25, 1);
        assert!(!summary.has_no_attendance());
    }

    #[test]
    fn test_classes_in_slot() {
        let mut summary = WorkSummary::empty(YearMonth::new(2025, 1).unwrap());
        summary.morning_classes = 2;
        summary.afternoon_classes = 3;
        summary.evening_classes = 1;
        assert_eq!(summary.classes_in(TimeSlot::Morning), 2);
        assert_eq!(summary.classes_in(TimeSlot::Afternoon), 3);
        assert_eq!(summary.classes_in(TimeSlot::Evening), 1);
    }

    #[test]
    fn test_deserialize_with_daily_breakdown() {
        let json = r#"{
            "year_month": "2025-03",
            "attendance_days": 1,
            "total_hours": "3",
            "total_classes": 1,
            "morning_classes": 1,
            "afternoon_classes": 0,
            "evening_classes": 0,
            "daily_breakdown": {
                "2025-03-04": [
                    {"time_slot": "morning", "status": "late", "check_in": "09:10:00", "check_out": "12:00:00"}
                ]
            }
        }"#;

        let summary: WorkSummary = serde_json::from_str(json).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let entries = &summary.daily_breakdown[&day];
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, AttendanceStatus::Late);
        assert_eq!(entries[0].check_in, NaiveTime::from_hms_opt(9, 10, 0));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&AttendanceStatus::HalfDay).unwrap(),
            "\"half_day\""
        );
        assert_eq!(serde_json::to_string(&TimeSlot::Evening).unwrap(), "\"evening\"");
    }
}
