//! Audit trace models.
//!
//! Every breakdown carries an [`AuditTrace`] so that a statement, or an operator
//! reviewing a disputed salary, can see which rule produced each figure and
//! which upstream data had to be repaired along the way.

use serde::{Deserialize, Serialize};

/// A single step in the audit trace recording a calculation decision.
///
/// Each step captures the input, output, and reasoning for a rule application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// How urgently a warning needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Informational; the figure is still trustworthy.
    Low,
    /// The engine substituted a default; check the source record.
    Medium,
    /// The figure rests on a fallback for data that should never occur.
    High,
}

/// A data-integrity warning generated while preparing or running a calculation.
///
/// Warnings never stop a calculation. They flag upstream configuration drift
/// such as an unrecognised pay model or an amount stored as unparsable text.
///
/// # Example
///
/// ```
/// use instructor_payroll::models::{AuditWarning, WarningSeverity};
///
/// let warning = AuditWarning::new(
///     AuditWarning::UNKNOWN_PAY_MODEL,
///     "Unrecognised pay model 'weekly'",
///     WarningSeverity::High,
/// );
/// assert_eq!(warning.code, "UNKNOWN_PAY_MODEL");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level.
    pub severity: WarningSeverity,
}

impl AuditWarning {
    /// The instructor's pay model label is not one the engine knows.
    pub const UNKNOWN_PAY_MODEL: &'static str = "UNKNOWN_PAY_MODEL";
    /// The instructor's tax regime label is not one the engine knows.
    pub const UNKNOWN_TAX_REGIME: &'static str = "UNKNOWN_TAX_REGIME";
    /// A stored amount could not be parsed and was read as zero.
    pub const UNPARSEABLE_AMOUNT: &'static str = "UNPARSEABLE_AMOUNT";
    /// A negative amount was clamped to zero.
    pub const NEGATIVE_AMOUNT: &'static str = "NEGATIVE_AMOUNT";
    /// An amount above [`MAX_AMOUNT`](crate::models::MAX_AMOUNT) was clamped.
    pub const AMOUNT_OUT_OF_RANGE: &'static str = "AMOUNT_OUT_OF_RANGE";

    /// Creates a warning.
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        severity: WarningSeverity,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            severity,
        }
    }
}

/// The complete audit trace for a calculation.
///
/// Unlike a log, the trace is part of the breakdown and therefore deterministic:
/// it holds no timestamps or durations, so identical inputs produce identical
/// traces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

impl AuditTrace {
    /// The number the next pushed step should carry.
    pub fn next_step_number(&self) -> u32 {
        self.steps.len() as u32 + 1
    }

    /// Returns true if any warning has the given code.
    pub fn has_warning(&self, code: &str) -> bool {
        self.warnings.iter().any(|w| w.code == code)
    }
}
