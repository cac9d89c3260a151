//! Instructor Payroll Engine for academies
//!
//! This crate turns a month of instructor attendance into a net payable salary
//! under hourly, per-class, monthly and mixed pay models, withholds tax under a
//! flat or itemised statutory insurance regime, and manages the resulting
//! salary records through to payment.

#![warn(missing_docs)]

pub mod api;
pub mod attendance;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
