//! Persisted salary records.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CompensationBreakdown, YearMonth};

/// Payment state of a salary record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet paid; the breakdown may still be recalculated.
    Unpaid,
    /// Paid; the record is frozen.
    Paid,
}

/// A saved breakdown plus its payment state.
///
/// `version` starts at 1 and increases on every mutation. Callers that read a
/// record and later act on it pass the version back so that a concurrent change
/// is reported instead of overwritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRecord {
    /// Unique identifier.
    pub id: Uuid,
    /// The instructor paid.
    pub instructor_id: String,
    /// The month worked.
    pub year_month: YearMonth,
    /// The saved calculation.
    pub breakdown: CompensationBreakdown,
    /// Whether the salary has been paid.
    pub payment_status: PaymentStatus,
    /// When it was paid.
    pub payment_date: Option<NaiveDate>,
    /// Optimistic concurrency counter.
    pub version: u64,
    /// When the record was saved.
    pub created_at: DateTime<Utc>,
    /// When the record last changed.
    pub updated_at: DateTime<Utc>,
}

impl SalaryRecord {
    /// A fresh unpaid record.
    pub fn new(
        instructor_id: impl Into<String>,
        year_month: YearMonth,
        breakdown: CompensationBreakdown,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            instructor_id: instructor_id.into(),
            year_month,
            breakdown,
            payment_status: PaymentStatus::Unpaid,
            payment_date: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// True once paid.
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Paid
    }

    /// The amount paid out (or to be paid out).
    pub fn net_salary(&self) -> Decimal {
        self.breakdown.net_salary
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

/// Filter for listing records. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryFilter {
    /// Only this instructor.
    #[serde(default)]
    pub instructor_id: Option<String>,
    /// Only this month.
    #[serde(default)]
    pub year_month: Option<YearMonth>,
    /// Only this status.
    #[serde(default)]
    pub payment_status: Option<PaymentStatus>,
}

impl SalaryFilter {
    /// Checks whether `record` passes the filter.
    pub fn matches(&self, record: &SalaryRecord) -> bool {
        self.instructor_id
            .as_ref()
            .is_none_or(|id| *id == record.instructor_id)
            && self.year_month.is_none_or(|ym| ym == record.year_month)
            && self
                .payment_status
                .is_none_or(|status| status == record.payment_status)
    }
}

/// Monthly totals across all instructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySummary {
    /// The month summarised.
    pub year_month: YearMonth,
    /// Number of records.
    pub total_records: usize,
    /// Sum of net salaries.
    pub total_net_salary: Decimal,
    /// Net salary already paid.
    pub total_paid: Decimal,
    /// Net salary still owed.
    pub total_unpaid: Decimal,
    /// Records paid.
    pub paid_count: usize,
    /// Records unpaid.
    pub unpaid_count: usize,
}

impl SalarySummary {
    /// Totals `records`, ignoring any outside `year_month`.
    pub fn from_records<'a>(
        year_month: YearMonth,
        records: impl IntoIterator<Item = &'a SalaryRecord>,
    ) -> Self {
        let mut summary = Self {
            year_month,
            total_records: 0,
            total_net_salary: Decimal::ZERO,
            total_paid: Decimal::ZERO,
            total_unpaid: Decimal::ZERO,
            paid_count: 0,
            unpaid_count: 0,
        };

        for record in records.into_iter().filter(|r| r.year_month == year_month) {
            summary.total_records += 1;
            let net = record.net_salary();
            summary.total_net_salary = summary.total_net_salary.saturating_add(net);
            if record.is_paid() {
                summary.paid_count += 1;
                summary.total_paid = summary.total_paid.saturating_add(net);
            } else {
                summary.unpaid_count += 1;
                summary.total_unpaid = summary.total_unpaid.saturating_add(net);
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuditTrace, TaxRegime, WorkFacts};

    fn breakdown(net: i64) -> CompensationBreakdown {
        let net = Decimal::from(net);
        CompensationBreakdown {
            base_amount: net,
            incentive_amount: Decimal::ZERO,
            gross_salary: net,
            tax_regime: TaxRegime::None,
            tax_amount: Decimal::ZERO,
            insurance_component_breakdown: None,
            total_deduction: Decimal::ZERO,
            net_salary: net,
            work_facts: WorkFacts {
                pay_model: "monthly".to_string(),
                total_hours: Decimal::ZERO,
                total_classes: 0,
                morning_classes: 0,
                afternoon_classes: 0,
                evening_classes: 0,
                attendance_days: 0,
            },
            audit_trace: AuditTrace::default(),
        }
    }

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    #[test]
    fn test_new_record_is_unpaid_version_one() {
        let record = SalaryRecord::new("inst_1", ym("2025-03"), breakdown(100));
        assert_eq!(record.payment_status, PaymentStatus::Unpaid);
        assert!(record.payment_date.is_none());
        assert_eq!(record.version, 1);
        assert_eq!(record.created_at, record.updated_at);
    }

    #[test]
    fn test_touch_bumps_version() {
        let mut record = SalaryRecord::new("inst_1", ym("2025-03"), breakdown(100));
        record.touch();
        assert_eq!(record.version, 2);
        assert!(record.updated_at >= record.created_at);
    }

    #[test]
    fn test_filter_matches() {
        let record = SalaryRecord::new("inst_1", ym("2025-03"), breakdown(100));

        assert!(SalaryFilter::default().matches(&record));
        assert!(
            SalaryFilter {
                instructor_id: Some("inst_1".to_string()),
                year_month: Some(ym("2025-03")),
                payment_status: Some(PaymentStatus::Unpaid),
            }
            .matches(&record)
        );
        assert!(
            !SalaryFilter {
                instructor_id: Some("inst_2".to_string()),
                ..Default::default()
            }
            .matches(&record)
        );
        assert!(
            !SalaryFilter {
                payment_status: Some(PaymentStatus::Paid),
                ..Default::default()
            }
            .matches(&record)
        );
    }

    #[test]
    fn test_summary_splits_paid_and_unpaid() {
        let mut paid = SalaryRecord::new("inst_1", ym("2025-03"), breakdown(1000));
        paid.payment_status = PaymentStatus::Paid;
        let unpaid = SalaryRecord::new("inst_2", ym("2025-03"), breakdown(250));
        let other_month = SalaryRecord::new("inst_3", ym("2025-04"), breakdown(999));

        let summary = SalarySummary::from_records(ym("2025-03"), [&paid, &unpaid, &other_month]);
        assert_eq!(summary.total_records, 2);
        assert_eq!(summary.total_net_salary, Decimal::from(1250));
        assert_eq!(summary.total_paid, Decimal::from(1000));
        assert_eq!(summary.total_unpaid, Decimal::from(250));
        assert_eq!(summary.paid_count, 1);
        assert_eq!(summary.unpaid_count, 1);
    }

    #[test]
    fn test_payment_status_serialization() {
        assert_eq!(serde_json::to_string(&PaymentStatus::Unpaid).unwrap(), "\"unpaid\"");
        let status: PaymentStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(status, PaymentStatus::Paid);
    }
}
