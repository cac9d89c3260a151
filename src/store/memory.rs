//! In-memory salary store.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{PayrollError, PayrollResult, ValidationError};
use crate::models::{
    CompensationBreakdown, PaymentStatus, SalaryFilter, SalaryRecord, SalarySummary, YearMonth,
};

use super::{
    BulkFailureReason, BulkPaymentFailure, BulkPaymentOutcome, PaymentOutcome, PaymentTarget,
    SalaryStore,
};

/// A [`SalaryStore`] keeping records in a map behind one lock.
///
/// Every write, including a whole bulk payment, happens under a single write
/// guard, so readers never observe a half-applied batch.
#[derive(Debug, Default)]
pub struct InMemorySalaryStore {
    records: RwLock<HashMap<Uuid, SalaryRecord>>,
}

impl InMemorySalaryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version(record: &SalaryRecord, expected: Option<u64>) -> PayrollResult<()> {
    match expected {
        Some(expected) if expected != record.version => Err(PayrollError::PersistenceConflict {
            record_id: record.id,
            expected,
            actual: record.version,
        }),
        _ => Ok(()),
    }
}

fn find_mut(
    records: &mut HashMap<Uuid, SalaryRecord>,
    record_id: Uuid,
) -> PayrollResult<&mut SalaryRecord> {
    records
        .get_mut(&record_id)
        .ok_or(PayrollError::RecordNotFound { record_id })
}

fn pay(
    records: &mut HashMap<Uuid, SalaryRecord>,
    target: PaymentTarget,
    payment_date: NaiveDate,
) -> PayrollResult<PaymentOutcome> {
    let record = find_mut(records, target.record_id)?;

    if record.is_paid() {
        return Ok(PaymentOutcome::AlreadyPaid(record.clone()));
    }
    check_version(record, target.expected_version)?;

    record.payment_status = PaymentStatus::Paid;
    record.payment_date = Some(payment_date);
    record.touch();
    Ok(PaymentOutcome::Paid(record.clone()))
}

fn pay_all(
    records: &mut HashMap<Uuid, SalaryRecord>,
    targets: &[PaymentTarget],
    payment_date: NaiveDate,
) -> PayrollResult<BulkPaymentOutcome> {
    let mut outcome = BulkPaymentOutcome::default();

    for target in targets {
        match pay(records, *target, payment_date) {
            Ok(PaymentOutcome::Paid(_)) => outcome.succeeded.push(target.record_id),
            Ok(PaymentOutcome::AlreadyPaid(_)) => outcome.skipped.push(target.record_id),
            Err(PayrollError::RecordNotFound { record_id }) => {
                outcome.failed.push(BulkPaymentFailure {
                    record_id,
                    reason: BulkFailureReason::NotFound,
                })
            }
            Err(PayrollError::PersistenceConflict {
                record_id,
                expected,
                actual,
            }) => outcome.failed.push(BulkPaymentFailure {
                record_id,
                reason: BulkFailureReason::VersionConflict { expected, actual },
            }),
            Err(other) => return Err(other),
        }
    }

    info!(
        succeeded = outcome.succeeded.len(),
        skipped = outcome.skipped.len(),
        failed = outcome.failed.len(),
        "Bulk payment applied"
    );
    Ok(outcome)
}

impl SalaryStore for InMemorySalaryStore {
    fn insert(&self, record: SalaryRecord) -> PayrollResult<SalaryRecord> {
        let mut records = self.records.write();

        let duplicate = records.values().any(|r| {
            r.instructor_id == record.instructor_id && r.year_month == record.year_month
        });
        if duplicate {
            return Err(ValidationError::DuplicateRecord {
                instructor_id: record.instructor_id,
                year_month: record.year_month,
            }
            .into());
        }

        debug!(record_id = %record.id, instructor_id = %record.instructor_id, "Inserting salary record");
        records.insert(record.id, record.clone());
        Ok(record)
    }

    fn get(&self, record_id: Uuid) -> PayrollResult<SalaryRecord> {
        self.records.read()
            .get(&record_id)
            .cloned()
            .ok_or(PayrollError::RecordNotFound { record_id })
    }

    fn list(&self, filter: &SalaryFilter) -> PayrollResult<Vec<SalaryRecord>> {
        let mut matching: Vec<SalaryRecord> = self
            .records
            .read()
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.year_month
                .cmp(&a.year_month)
                .then_with(|| a.instructor_id.cmp(&b.instructor_id))
        });
        Ok(matching)
    }

    fn replace_breakdown(
        &self,
        record_id: Uuid,
        expected_version: Option<u64>,
        breakdown: CompensationBreakdown,
    ) -> PayrollResult<SalaryRecord> {
        let mut records = self.records.write();
        let record = find_mut(&mut records, record_id)?;

        if record.is_paid() {
            return Err(ValidationError::RecordAlreadyPaid { record_id }.into());
        }
        check_version(record, expected_version)?;

        record.breakdown = breakdown;
        record.touch();
        Ok(record.clone())
    }

    fn mark_paid(
        &self,
        target: PaymentTarget,
        payment_date: NaiveDate,
    ) -> PayrollResult<PaymentOutcome> {
        let mut records = self.records.write();
        pay(&mut records, target, payment_date)
    }

    fn bulk_mark_paid(
        &self,
        targets: &[PaymentTarget],
        payment_date: NaiveDate,
    ) -> PayrollResult<BulkPaymentOutcome> {
        let mut records = self.records.write();
        let mut seen = HashSet::new();
        let targets: Vec<PaymentTarget> = targets
            .iter()
            .copied()
            .filter(|t| seen.insert(t.record_id))
            .collect();
        pay_all(&mut records, &targets, payment_date)
    }

    fn mark_month_paid(
        &self,
        year_month: YearMonth,
        payment_date: NaiveDate,
    ) -> PayrollResult<BulkPaymentOutcome> {
        let mut records = self.records.write();
        let mut unpaid: Vec<&SalaryRecord> = records
            .values()
            .filter(|r| r.year_month == year_month && !r.is_paid())
            .collect();
        unpaid.sort_by(|a, b| a.instructor_id.cmp(&b.instructor_id));
        let targets: Vec<PaymentTarget> = unpaid.iter().map(|r| PaymentTarget::from(r.id)).collect();

        debug!(year_month = %year_month, count = targets.len(), "Paying unpaid records for month");
        pay_all(&mut records, &targets, payment_date)
    }

    fn delete(
        &self,
        record_id: Uuid,
        expected_version: Option<u64>,
    ) -> PayrollResult<SalaryRecord> {
        let mut records = self.records.write();
        let record = find_mut(&mut records, record_id)?;

        if record.is_paid() {
            return Err(ValidationError::RecordAlreadyPaid { record_id }.into());
        }
        check_version(record, expected_version)?;

        records
            .remove(&record_id)
            .ok_or(PayrollError::RecordNotFound { record_id })
    }

    fn summary(&self, year_month: YearMonth) -> PayrollResult<SalarySummary> {
        let records = self.records.read();
        Ok(SalarySummary::from_records(year_month, records.values()))
    }
}
