//! Payroll orchestration.
//!
//! [`PayrollService`] is the single entry point for everything that touches a
//! salary record: it aggregates attendance, picks the tax rates in force for
//! the month, runs the calculation and hands the result to the store.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendance::WorkSummaryAggregator;
use crate::calculation::{apply_adjustments, calculate_compensation};
use crate::config::ConfigLoader;
use crate::error::{PayrollError, PayrollResult, ValidationError};
use crate::models::{
    Adjustments, CompensationBreakdown, CompensationProfile, InstructorRecord, RawAmount,
    SalaryFilter, SalaryRecord, SalarySummary, WorkSummary, YearMonth,
};
use crate::store::{BulkPaymentOutcome, PaymentOutcome, PaymentTarget, SalaryStore};

/// Runs calculations and manages salary records.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use instructor_payroll::attendance::AttendanceLedger;
/// use instructor_payroll::config::{AttendanceSettings, ConfigLoader};
/// use instructor_payroll::models::{Adjustments, InstructorRecord, RawAmount};
/// use instructor_payroll::service::PayrollService;
/// use instructor_payroll::store::InMemorySalaryStore;
/// use rust_decimal::Decimal;
///
/// # let config = ConfigLoader::load("./config/academy").unwrap();
/// let service = PayrollService::new(Arc::new(config), Arc::new(InMemorySalaryStore::new()));
///
/// let instructor = InstructorRecord {
///     id: "inst_001".to_string(),
///     salary_type: "monthly".to_string(),
///     base_salary: RawAmount::from(2_000_000),
///     tax_type: "none".to_string(),
///     ..Default::default()
/// };
/// let ledger = AttendanceLedger::new(AttendanceSettings::default());
///
/// let record = service
///     .calculate_and_save(&ledger, &instructor, "2025-03".parse().unwrap(), &Adjustments::none())
///     .unwrap();
/// assert_eq!(record.net_salary(), Decimal::from(2_000_000));
/// ```
pub struct PayrollService<S: SalaryStore> {
    config: Arc<ConfigLoader>,
    store: Arc<S>,
}

impl<S: SalaryStore> Clone for PayrollService<S> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SalaryStore> PayrollService<S> {
    /// Creates a service over a loaded configuration and a store.
    pub fn new(config: Arc<ConfigLoader>, store: Arc<S>) -> Self {
        Self { config, store }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Calculates a month's compensation without saving it.
    ///
    /// # Errors
    ///
    /// - `MissingSelection` when the instructor id is blank.
    /// - `AggregationFailure` when the aggregator fails.
    /// - `TaxRatesNotFound` when no rate table covers the month.
    /// - Any validation error from the calculation.
    pub fn calculate(
        &self,
        aggregator: &dyn WorkSummaryAggregator,
        instructor: &InstructorRecord,
        year_month: YearMonth,
        adjustments: &Adjustments,
    ) -> PayrollResult<CompensationBreakdown> {
        if instructor.id.trim().is_empty() {
            return Err(ValidationError::MissingSelection {
                field: "instructor".to_string(),
            }
            .into());
        }

        let profile = CompensationProfile::from_record(instructor);
        let summary = self.work_summary(aggregator, &instructor.id, year_month)?;

        let rates = self.config.tax_rates_for(year_month)?;

        let breakdown = calculate_compensation(&profile, &summary, adjustments, &rates)?;

        info!(
            instructor_id = %instructor.id,
            year_month = %year_month,
            pay_model = %breakdown.work_facts.pay_model,
            gross_salary = %breakdown.gross_salary,
            tax_amount = %breakdown.tax_amount,
            net_salary = %breakdown.net_salary,
            warnings = breakdown.audit_trace.warnings.len(),
            "Compensation calculated"
        );

        Ok(breakdown)
    }

    /// The attendance facts for one instructor and month.
    ///
    /// # Errors
    ///
    /// - `MissingSelection` when the instructor id is blank.
    /// - `AggregationFailure` wrapping whatever the aggregator returned.
    pub fn work_summary(
        &self,
        aggregator: &dyn WorkSummaryAggregator,
        instructor_id: &str,
        year_month: YearMonth,
    ) -> PayrollResult<WorkSummary> {
        if instructor_id.trim().is_empty() {
            return Err(ValidationError::MissingSelection {
                field: "instructor".to_string(),
            }
            .into());
        }

        aggregator
            .work_summary(instructor_id, year_month)
            .map_err(|e| match e {
                PayrollError::AggregationFailure { .. } => e,
                other => PayrollError::AggregationFailure {
                    instructor_id: instructor_id.to_string(),
                    message: other.to_string(),
                },
            })
    }

    /// Calculates and saves a new unpaid record.
    ///
    /// # Errors
    ///
    /// As [`calculate`](Self::calculate), plus `DuplicateRecord` when the
    /// instructor already has a record for the month.
    pub fn calculate_and_save(
        &self,
        aggregator: &dyn WorkSummaryAggregator,
        instructor: &InstructorRecord,
        year_month: YearMonth,
        adjustments: &Adjustments,
    ) -> PayrollResult<SalaryRecord> {
        let breakdown = self.calculate(aggregator, instructor, year_month, adjustments)?;
        let record = self
            .store
            .insert(SalaryRecord::new(instructor.id.clone(), year_month, breakdown))?;

        info!(
            record_id = %record.id,
            instructor_id = %record.instructor_id,
            year_month = %record.year_month,
            "Salary record saved"
        );
        Ok(record)
    }

    /// Recomputes an unpaid record with the instructor's current profile and
    /// attendance, keeping the record's saved incentive and deduction.
    ///
    /// When `expected_version` is `None` the version read at the start of the
    /// call is used, so a change made during the recalculation still conflicts.
    ///
    /// # Errors
    ///
    /// - `RecordNotFound` for an unknown id.
    /// - `RecordAlreadyPaid` for a paid record.
    /// - `InstructorMismatch` when `instructor` is not the record's instructor.
    /// - `PersistenceConflict` when the record changed.
    pub fn recalculate(
        &self,
        aggregator: &dyn WorkSummaryAggregator,
        record_id: Uuid,
        expected_version: Option<u64>,
        instructor: &InstructorRecord,
    ) -> PayrollResult<SalaryRecord> {
        let record = self.store.get(record_id)?;

        if record.is_paid() {
            return Err(ValidationError::RecordAlreadyPaid { record_id }.into());
        }
        if instructor.id != record.instructor_id {
            return Err(ValidationError::InstructorMismatch {
                record_id,
                expected: record.instructor_id,
                actual: instructor.id.clone(),
            }
            .into());
        }

        let adjustments = Adjustments::new(
            record.breakdown.incentive_amount,
            record.breakdown.total_deduction,
        );
        let breakdown = self.calculate(aggregator, instructor, record.year_month, &adjustments)?;

        let updated = self.store.replace_breakdown(
            record_id,
            Some(expected_version.unwrap_or(record.version)),
            breakdown,
        )?;

        info!(
            record_id = %record_id,
            version = updated.version,
            net_salary = %updated.net_salary(),
            "Salary record recalculated"
        );
        Ok(updated)
    }

    /// Changes the incentive and/or deduction of an unpaid record.
    ///
    /// A field left as `None` keeps its saved value. The base amount and
    /// attendance facts are kept; gross, tax and net are recomputed with the
    /// rates in force for the record's month.
    ///
    /// # Errors
    ///
    /// - `NoFieldsToUpdate` when both fields are `None`.
    /// - `RecordNotFound` for an unknown id.
    /// - `RecordAlreadyPaid` for a paid record.
    /// - `DeductionExceedsPay` when the new deduction is too large.
    /// - `PersistenceConflict` when the record changed.
    pub fn update_adjustments(
        &self,
        record_id: Uuid,
        expected_version: Option<u64>,
        incentive_amount: Option<&RawAmount>,
        total_deduction: Option<&RawAmount>,
    ) -> PayrollResult<SalaryRecord> {
        if incentive_amount.is_none() && total_deduction.is_none() {
            return Err(ValidationError::NoFieldsToUpdate { record_id }.into());
        }

        let record = self.store.get(record_id)?;
        if record.is_paid() {
            return Err(ValidationError::RecordAlreadyPaid { record_id }.into());
        }

        let mut warnings = Vec::new();
        let adjustments = Adjustments {
            incentive_amount: incentive_amount.map_or(record.breakdown.incentive_amount, |raw| {
                raw.coerce("incentive_amount", &mut warnings)
            }),
            deduction_amount: total_deduction.map_or(record.breakdown.total_deduction, |raw| {
                raw.coerce("deduction_amount", &mut warnings)
            }),
            warnings,
        };

        let rates = self.config.tax_rates_for(record.year_month)?;
        let breakdown = apply_adjustments(&record.breakdown, &adjustments, &rates)?;

        let updated = self.store.replace_breakdown(
            record_id,
            Some(expected_version.unwrap_or(record.version)),
            breakdown,
        )?;

        info!(
            record_id = %record_id,
            version = updated.version,
            incentive_amount = %updated.breakdown.incentive_amount,
            total_deduction = %updated.breakdown.total_deduction,
            net_salary = %updated.net_salary(),
            "Salary record adjusted"
        );
        Ok(updated)
    }

    /// Marks one record paid.
    pub fn mark_paid(
        &self,
        target: PaymentTarget,
        payment_date: NaiveDate,
    ) -> PayrollResult<PaymentOutcome> {
        let outcome = self.store.mark_paid(target, payment_date)?;
        match &outcome {
            PaymentOutcome::Paid(record) => info!(
                record_id = %record.id,
                payment_date = %payment_date,
                net_salary = %record.net_salary(),
                "Salary record paid"
            ),
            PaymentOutcome::AlreadyPaid(record) => warn!(
                record_id = %record.id,
                "Salary record already paid; payment ignored"
            ),
        }
        Ok(outcome)
    }

    /// Marks many records paid in one operation.
    pub fn bulk_mark_paid(
        &self,
        targets: &[PaymentTarget],
        payment_date: NaiveDate,
    ) -> PayrollResult<BulkPaymentOutcome> {
        let outcome = self.store.bulk_mark_paid(targets, payment_date)?;
        for failure in &outcome.failed {
            warn!(
                record_id = %failure.record_id,
                reason = ?failure.reason,
                "Bulk payment skipped a record"
            );
        }
        Ok(outcome)
    }

    /// Marks every unpaid record of a month paid.
    pub fn mark_month_paid(
        &self,
        year_month: YearMonth,
        payment_date: NaiveDate,
    ) -> PayrollResult<BulkPaymentOutcome> {
        let outcome = self.store.mark_month_paid(year_month, payment_date)?;
        info!(
            year_month = %year_month,
            paid = outcome.succeeded.len(),
            "Month paid"
        );
        Ok(outcome)
    }

    /// Deletes an unpaid record.
    pub fn delete(
        &self,
        record_id: Uuid,
        expected_version: Option<u64>,
    ) -> PayrollResult<SalaryRecord> {
        let record = self.store.delete(record_id, expected_version)?;
        info!(record_id = %record_id, "Salary record deleted");
        Ok(record)
    }

    /// Fetches a record.
    pub fn get(&self, record_id: Uuid) -> PayrollResult<SalaryRecord> {
        self.store.get(record_id)
    }

    /// Lists records matching `filter`.
    pub fn list(&self, filter: &SalaryFilter) -> PayrollResult<Vec<SalaryRecord>> {
        self.store.list(filter)
    }

    /// Totals for a month.
    pub fn summary(&self, year_month: YearMonth) -> PayrollResult<SalarySummary> {
        self.store.summary(year_month)
    }
}
