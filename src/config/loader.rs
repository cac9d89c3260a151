//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::calculation::TaxRates;
use crate::error::{PayrollError, PayrollResult};
use crate::models::YearMonth;

use super::types::{AttendanceSettings, EngineFile, EngineMetadata, PayrollConfig, TaxRateConfig};

/// Loads and provides access to payroll configuration.
///
/// # Directory Structure
///
/// ```text
/// config/academy/
/// ├── engine.yaml          # Academy metadata and attendance settings
/// └── tax_rates/
///     └── 2025-01-01.yaml  # Tax rates effective from this date
/// ```
///
/// # Example
///
/// ```no_run
/// use instructor_payroll::config::ConfigLoader;
/// use instructor_payroll::models::YearMonth;
///
/// let loader = ConfigLoader::load("./config/academy")?;
/// let rates = loader.tax_rates_for(YearMonth::new(2025, 3).unwrap())?;
/// println!("Flat rate: {}", rates.flat_rate);
/// # Ok::<(), instructor_payroll::error::PayrollError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if `engine.yaml` or the `tax_rates` directory
    /// is missing (or holds no rate files), and `ConfigParseError` if any file
    /// contains invalid YAML.
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();

        let engine_file = Self::load_yaml::<EngineFile>(&path.join("engine.yaml"))?;
        let tax_rates = Self::load_tax_rates(&path.join("tax_rates"))?;

        let config = PayrollConfig::new(engine_file.engine, engine_file.attendance, tax_rates);

        Ok(Self { config })
    }

    /// Wraps an already built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Loads all rate files from the tax rates directory.
    fn load_tax_rates(dir: &Path) -> PayrollResult<Vec<TaxRateConfig>> {
        let dir_str = dir.display().to_string();

        let entries = fs::read_dir(dir).map_err(|_| PayrollError::ConfigNotFound {
            path: dir_str.clone(),
        })?;

        let mut tables = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|_| PayrollError::ConfigNotFound {
                path: dir_str.clone(),
            })?;

            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "yaml") {
                tables.push(Self::load_yaml::<TaxRateConfig>(&path)?);
            }
        }

        if tables.is_empty() {
            return Err(PayrollError::ConfigNotFound {
                path: format!("{} (no rate files found)", dir_str),
            });
        }

        Ok(tables)
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Returns the academy metadata.
    pub fn engine(&self) -> &EngineMetadata {
        self.config.engine()
    }

    /// Returns the attendance settings.
    pub fn attendance(&self) -> &AttendanceSettings {
        self.config.attendance()
    }

    /// Gets the tax rates in force for a month.
    ///
    /// Picks the table with the latest `effective_from` on or before the
    /// first day of `year_month`.
    ///
    /// # Errors
    ///
    /// Returns `TaxRatesNotFound` if every table starts after the month.
    pub fn tax_rates_for(&self, year_month: YearMonth) -> PayrollResult<TaxRates> {
        let first_day = year_month.first_day();
        self.config
            .tax_rates()
            .iter()
            .rfind(|table| table.effective_from <= first_day)
            .map(TaxRateConfig::rates)
            .ok_or(PayrollError::TaxRatesNotFound { year_month })
    }
}
