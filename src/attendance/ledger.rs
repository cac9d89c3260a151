//! In-memory attendance ledger.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculation::round_hours;
use crate::config::AttendanceSettings;
use crate::error::PayrollResult;
use crate::models::{AttendanceStatus, SlotAttendance, TimeSlot, WorkSummary, YearMonth};

use super::WorkSummaryAggregator;

const SECONDS_PER_HOUR: i64 = 3600;

/// One attendance entry for one instructor, date and slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// The instructor.
    pub instructor_id: String,
    /// The day worked.
    pub work_date: NaiveDate,
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

impl AttendanceRecord {
    /// Hours credited for this entry.
    ///
    /// Uses `check_out - check_in` when both times are present, crediting
    /// nothing when check-out is not after check-in. `default_hours` applies
    /// only when a time is missing.
    pub fn hours(&self, default_hours: Decimal) -> Decimal {
        match (self.check_in, self.check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                Decimal::from((check_out - check_in).num_seconds())
                    / Decimal::from(SECONDS_PER_HOUR)
            }
            (Some(_), Some(_)) => Decimal::ZERO,
            _ => default_hours,
        }
    }
}

/// Builds a work summary from the counted entries of `records` that belong
/// to `instructor_id` and fall inside `year_month`.
///
/// Slot totals are derived from the same entries that populate the daily
/// breakdown, so the two always agree.
///
/// # Example
///
/// ```
/// use instructor_payroll::attendance::{AttendanceRecord, summarize};
/// use instructor_payroll::config::AttendanceSettings;
/// use instructor_payroll::models::{AttendanceStatus, TimeSlot, YearMonth};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let record = AttendanceRecord {
///     instructor_id: "inst_001".to_string(),
///     work_date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
///     time_slot: TimeSlot::Morning,
///     status: AttendanceStatus::Present,
///     check_in: None,
///     check_out: None,
/// };
///
/// let summary = summarize(
///     "inst_001",
///     YearMonth::new(2025, 3).unwrap(),
///     &[record],
///     &AttendanceSettings::default(),
/// );
/// assert_eq!(summary.morning_classes, 1);
/// assert_eq!(summary.total_hours, Decimal::from(3));
/// ```
pub fn summarize<'a>(
    instructor_id: &str,
    year_month: YearMonth,
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    settings: &AttendanceSettings,
) -> WorkSummary {
    let mut summary = WorkSummary::empty(year_month);
    let mut days = BTreeSet::new();
    let mut hours = Decimal::ZERO;

    let counted = records.into_iter().filter(|r| {
        r.instructor_id == instructor_id
            && year_month.contains(r.work_date)
            && settings.counted_statuses.contains(&r.status)
    });

    for record in counted {
        days.insert(record.work_date);
        hours += record.hours(settings.default_slot_hours);

        summary.total_classes += 1;
        match record.time_slot {
            TimeSlot::Morning => summary.morning_classes += 1,
            TimeSlot::Afternoon => summary.afternoon_classes += 1,
            TimeSlot::Evening => summary.evening_classes += 1,
        }

        summary
            .daily_breakdown
            .entry(record.work_date)
            .or_default()
            .push(SlotAttendance {
                time_slot: record.time_slot,
                status: record.status,
                check_in: record.check_in,
                check_out: record.check_out,
            });
    }

    for entries in summary.daily_breakdown.values_mut() {
        entries.sort_by_key(|e| e.time_slot);
    }

    summary.attendance_days = days.len() as u32;
    summary.total_hours = round_hours(hours);
    summary
}

/// Attendance records held in memory.
#[derive(Debug, Clone, Default)]
pub struct AttendanceLedger {
    settings: AttendanceSettings,
    records: Vec<AttendanceRecord>,
}

impl AttendanceLedger {
    /// An empty ledger.
    pub fn new(settings: AttendanceSettings) -> Self {
        Self {
            settings,
            records: Vec::new(),
        }
    }

    /// A ledger holding `records`.
    pub fn from_records(settings: AttendanceSettings, records: Vec<AttendanceRecord>) -> Self {
        Self { settings, records }
    }

    /// Adds an entry.
    pub fn record(&mut self, record: AttendanceRecord) {
        self.records.push(record);
    }

    /// All entries, in insertion order.
    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }
}

impl WorkSummaryAggregator for AttendanceLedger {
    fn work_summary(
        &self,
        instructor_id: &str,
        year_month: YearMonth,
    ) -> PayrollResult<WorkSummary> {
        Ok(summarize(
            instructor_id,
            year_month,
            &self.records,
            &self.settings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn time(s: &str) -> Option<NaiveTime> {
        Some(NaiveTime::parse_from_str(s, "%H:%M").unwrap())
    }

    fn entry(
        instructor: &str,
        date: &str,
        slot: TimeSlot,
        status: AttendanceStatus,
        check_in: Option<NaiveTime>,
        check_out: Option<NaiveTime>,
    ) -> AttendanceRecord {
        AttendanceRecord {
            instructor_id: instructor.to_string(),
            work_date: date.parse().unwrap(),
            time_slot: slot,
            status,
            check_in,
            check_out,
        }
    }

    fn march() -> YearMonth {
        YearMonth::new(2025, 3).unwrap()
    }

    #[test]
    fn test_hours_from_check_times() {
        let e = entry(
            "i",
            "2025-03-03",
            TimeSlot::Morning,
            AttendanceStatus::Present,
            time("09:00"),
            time("11:30"),
        );
        assert_eq!(e.hours(dec("3")), dec("2.5"));
    }

    #[test]
    fn test_missing_time_uses_default_and_inverted_span_credits_nothing() {
        let missing = entry(
            "i",
            "2025-03-03",
            TimeSlot::Morning,
            AttendanceStatus::Present,
            time("09:00"),
            None,
        );
        assert_eq!(missing.hours(dec("3")), dec("3"));

        let inverted = entry(
            "i",
            "2025-03-03",
            TimeSlot::Morning,
            AttendanceStatus::Present,
            time("12:00"),
            time("09:00"),
        );
        assert_eq!(inverted.hours(dec("3")), Decimal::ZERO);

        let same = entry(
            "i",
            "2025-03-03",
            TimeSlot::Morning,
            AttendanceStatus::Present,
            time("09:00"),
            time("09:00"),
        );
        assert_eq!(same.hours(dec("3")), Decimal::ZERO);
    }

    #[test]
    fn test_only_counted_statuses_in_month_for_instructor() {
        let records = vec![
            entry("a", "2025-03-03", TimeSlot::Morning, AttendanceStatus::Present, None, None),
            entry("a", "2025-03-03", TimeSlot::Evening, AttendanceStatus::Late, None, None),
            entry("a", "2025-03-04", TimeSlot::Afternoon, AttendanceStatus::HalfDay, None, None),
            entry("a", "2025-03-05", TimeSlot::Morning, AttendanceStatus::Absent, None, None),
            entry("a", "2025-03-06", TimeSlot::Morning, AttendanceStatus::Excused, None, None),
            entry("a", "2025-04-01", TimeSlot::Morning, AttendanceStatus::Present, None, None),
            entry("b", "2025-03-03", TimeSlot::Morning, AttendanceStatus::Present, None, None),
        ];

        let summary = summarize("a", march(), &records, &AttendanceSettings::default());
        assert_eq!(summary.total_classes, 3);
        assert_eq!(summary.morning_classes, 1);
        assert_eq!(summary.afternoon_classes, 1);
        assert_eq!(summary.evening_classes, 1);
        assert_eq!(summary.attendance_days, 2);
        assert_eq!(summary.total_hours, dec("9"));
        assert_eq!(summary.daily_breakdown.len(), 2);
    }

    #[test]
    fn test_total_hours_rounded_to_two_places() {
        let records = vec![
            entry("a", "2025-03-03", TimeSlot::Morning, AttendanceStatus::Present, time("09:00"), time("09:20")),
        ];
        let summary = summarize("a", march(), &records, &AttendanceSettings::default());
        assert_eq!(summary.total_hours, dec("0.33"));
    }

    #[test]
    fn test_slot_totals_match_daily_breakdown() {
        let records = vec![
            entry("a", "2025-03-03", TimeSlot::Evening, AttendanceStatus::Present, None, None),
            entry("a", "2025-03-03", TimeSlot::Morning, AttendanceStatus::Present, None, None),
            entry("a", "2025-03-10", TimeSlot::Morning, AttendanceStatus::Late, None, None),
            entry("a", "2025-03-17", TimeSlot::Afternoon, AttendanceStatus::Absent, None, None),
        ];
        let summary = summarize("a", march(), &records, &AttendanceSettings::default());

        let entries: Vec<&SlotAttendance> = summary.daily_breakdown.values().flatten().collect();
        assert_eq!(entries.len() as u32, summary.total_classes);
        for slot in [TimeSlot::Morning, TimeSlot::Afternoon, TimeSlot::Evening] {
            let in_breakdown = entries.iter().filter(|e| e.time_slot == slot).count() as u32;
            assert_eq!(in_breakdown, summary.classes_in(slot));
        }

        let day = NaiveDate::from_ymd_opt(2025, 3, 3).unwrap();
        let slots: Vec<TimeSlot> = summary.daily_breakdown[&day].iter().map(|e| e.time_slot).collect();
        assert_eq!(slots, vec![TimeSlot::Morning, TimeSlot::Evening]);
    }

    #[test]
    fn test_custom_settings() {
        let settings = AttendanceSettings {
            counted_statuses: vec![AttendanceStatus::Present],
            default_slot_hours: dec("2"),
        };
        let records = vec![
            entry("a", "2025-03-03", TimeSlot::Morning, AttendanceStatus::Present, None, None),
            entry("a", "2025-03-04", TimeSlot::Morning, AttendanceStatus::Late, None, None),
        ];
        let summary = summarize("a", march(), &records, &settings);
        assert_eq!(summary.total_classes, 1);
        assert_eq!(summary.total_hours, dec("2"));
    }

    #[test]
    fn test_ledger_aggregates_recorded_entries() {
        let mut ledger = AttendanceLedger::new(AttendanceSettings::default());
        assert!(ledger.work_summary("a", march()).unwrap().has_no_attendance());

        ledger.record(entry(
            "a",
            "2025-03-03",
            TimeSlot::Afternoon,
            AttendanceStatus::Present,
            time("14:00"),
            time("17:00"),
        ));
        let summary = ledger.work_summary("a", march()).unwrap();
        assert_eq!(summary.afternoon_classes, 1);
        assert_eq!(summary.total_hours, dec("3"));
        assert_eq!(ledger.records().len(), 1);
    }
}
