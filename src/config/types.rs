//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::{StatutoryRates, TaxRates};
use crate::models::AttendanceStatus;

/// Metadata about the academy the engine is configured for.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineMetadata {
    /// Display name of the academy.
    pub name: String,
    /// Currency code amounts are expressed in.
    pub currency: String,
}

/// How attendance records are turned into work summaries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceSettings {
    /// Statuses that count as worked.
    pub counted_statuses: Vec<AttendanceStatus>,
    /// Hours credited for a slot with a missing check-in or check-out.
    pub default_slot_hours: Decimal,
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            counted_statuses: vec![
                AttendanceStatus::Present,
                AttendanceStatus::Late,
                AttendanceStatus::HalfDay,
            ],
            default_slot_hours: Decimal::from(3),
        }
    }
}

/// `engine.yaml` file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineFile {
    /// Academy metadata.
    pub engine: EngineMetadata,
    /// Attendance aggregation settings.
    #[serde(default)]
    pub attendance: AttendanceSettings,
}

/// A tax rate table effective from a given date.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaxRateConfig {
    /// The first day these rates apply.
    pub effective_from: NaiveDate,
    /// Flat freelance withholding rate.
    pub flat_rate: Decimal,
    /// Statutory insurance rates.
    pub statutory: StatutoryRates,
}

impl TaxRateConfig {
    /// The rates as used by the calculation.
    pub fn rates(&self) -> TaxRates {
        TaxRates {
            flat_rate: self.flat_rate,
            statutory: self.statutory,
        }
    }
}

/// The complete payroll configuration.
#[derive(Debug, Clone)]
pub struct PayrollConfig {
    engine: EngineMetadata,
    attendance: AttendanceSettings,
    tax_rates: Vec<TaxRateConfig>,
}

impl PayrollConfig {
    /// Creates a configuration, sorting rate tables by effective date.
    pub fn new(
        engine: EngineMetadata,
        attendance: AttendanceSettings,
        mut tax_rates: Vec<TaxRateConfig>,
    ) -> Self {
        tax_rates.sort_by_key(|r| r.effective_from);
        Self {
            engine,
            attendance,
            tax_rates,
        }
    }

    /// Returns the academy metadata.
    pub fn engine(&self) -> &EngineMetadata {
        &self.engine
    }

    /// Returns the attendance settings.
    pub fn attendance(&self) -> &AttendanceSettings {
        &self.attendance
    }

    /// Returns the rate tables, oldest first.
    pub fn tax_rates(&self) -> &[TaxRateConfig] {
        &self.tax_rates
    }
}
