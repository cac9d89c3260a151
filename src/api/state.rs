//! Application state for the payroll API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::ConfigLoader;
use crate::service::PayrollService;
use crate::store::InMemorySalaryStore;

/// Shared application state.
///
/// Holds the payroll service, which in turn shares the loaded configuration
/// and the salary store across handlers.
#[derive(Clone)]
pub struct AppState {
    service: PayrollService<InMemorySalaryStore>,
}

impl AppState {
    /// Creates state with the given configuration and an empty store.
    pub fn new(config: ConfigLoader) -> Self {
        Self::with_store(config, InMemorySalaryStore::new())
    }

    /// Creates state over an existing store.
    pub fn with_store(config: ConfigLoader, store: InMemorySalaryStore) -> Self {
        Self {
            service: PayrollService::new(Arc::new(config), Arc::new(store)),
        }
    }

    /// Returns the payroll service.
    pub fn service(&self) -> &PayrollService<InMemorySalaryStore> {
        &self.service
    }

    /// Returns the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        self.service.config()
    }
}
