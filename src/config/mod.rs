//! Configuration loading and management for the payroll engine.
//!
//! This module loads academy settings and effective-dated tax rate tables from
//! YAML files, so that a yearly change in statutory rates is a new file rather
//! than a rebuild.
//!
//! # Example
//!
//! ```no_run
//! use instructor_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/academy").unwrap();
//! println!("Loaded academy: {}", config.engine().name);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{AttendanceSettings, EngineFile, EngineMetadata, PayrollConfig, TaxRateConfig};
