//! Instructor compensation profile.
//!
//! An [`InstructorRecord`] is the instructor row as stored: labels are free
//! text and amounts are [`RawAmount`]s. [`CompensationProfile::from_record`]
//! parses it once into strict types, turning the pay model into the
//! [`PayModel`] sum type and the withholding label into a [`TaxRegime`].

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{AuditWarning, RawAmount, WarningSeverity};

/// Per-time-slot class rates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRates {
    /// Rate for a morning class.
    pub morning: Decimal,
    /// Rate for an afternoon class.
    pub afternoon: Decimal,
    /// Rate for an evening class.
    pub evening: Decimal,
}

/// How an instructor's base pay is derived.
///
/// Each variant carries only the parameters its formula reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PayModel {
    /// `hourly_rate × total_hours`.
    Hourly {
        /// Pay per hour worked.
        hourly_rate: Decimal,
    },
    /// Per-slot class rates, falling back to `hourly_rate × total_classes`
    /// when every slot rate is zero.
    PerClass {
        /// Pay per class by time slot.
        rates: SlotRates,
        /// Fallback rate per class.
        hourly_rate: Decimal,
    },
    /// A fixed monthly salary, independent of attendance.
    Monthly {
        /// The monthly salary.
        base_salary: Decimal,
    },
    /// A fixed monthly salary plus per-slot class pay.
    Mixed {
        /// The fixed part.
        base_salary: Decimal,
        /// Pay per class by time slot.
        rates: SlotRates,
    },
    /// A label the engine does not recognise.
    Unknown {
        /// The label as stored.
        label: String,
        /// Used when positive.
        base_salary: Decimal,
        /// Used with total hours otherwise.
        hourly_rate: Decimal,
    },
}

impl PayModel {
    /// The pay model's label, as echoed on breakdowns.
    pub fn label(&self) -> &str {
        match self {
            PayModel::Hourly { .. } => "hourly",
            PayModel::PerClass { .. } => "per_class",
            PayModel::Monthly { .. } => "monthly",
            PayModel::Mixed { .. } => "mixed",
            PayModel::Unknown { label, .. } => label,
        }
    }

    /// Whether a month with no attendance makes the figure meaningless.
    ///
    /// An unknown model is attendance-dependent only when it will fall back to
    /// the hourly formula.
    pub fn requires_attendance(&self) -> bool {
        match self {
            PayModel::Hourly { .. } | PayModel::PerClass { .. } | PayModel::Mixed { .. } => true,
            PayModel::Monthly { .. } => false,
            PayModel::Unknown { base_salary, .. } => *base_salary <= Decimal::ZERO,
        }
    }
}

/// The withholding scheme applied to gross pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    /// Nothing withheld.
    None,
    /// Flat 3.3% freelance withholding.
    #[serde(rename = "flat_3_3_percent")]
    Flat33Percent,
    /// Itemised statutory social insurance.
    StatutoryInsurance,
}

impl TaxRegime {
    /// Maps a stored label to a regime.
    ///
    /// Accepts the canonical names and the labels the instructor table uses
    /// (`"3.3%"`, `"insurance"`). Returns `None` for anything else.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "none" | "" => Some(TaxRegime::None),
            "flat_3_3_percent" | "3.3%" | "3.3" | "freelancer" => Some(TaxRegime::Flat33Percent),
            "statutory_insurance" | "insurance" => Some(TaxRegime::StatutoryInsurance),
            _ => None,
        }
    }

    /// The canonical label.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxRegime::None => "none",
            TaxRegime::Flat33Percent => "flat_3_3_percent",
            TaxRegime::StatutoryInsurance => "statutory_insurance",
        }
    }
}

/// An instructor row as persisted, before any parsing.
///
/// # Example
///
/// ```
/// use instructor_payroll::models::InstructorRecord;
///
/// let record: InstructorRecord = serde_json::from_str(r#"{
///     "id": "inst_001",
///     "name": "Kim",
///     "salary_type": "per_class",
///     "hourly_rate": "15000",
///     "morning_class_rate": 10000,
///     "tax_type": "3.3%"
/// }"#).unwrap();
/// assert_eq!(record.salary_type, "per_class");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstructorRecord {
    /// Unique identifier for the instructor.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// The pay model label.
    #[serde(default, alias = "pay_model")]
    pub salary_type: String,
    /// Hourly rate.
    #[serde(default)]
    pub hourly_rate: RawAmount,
    /// Morning class rate.
    #[serde(default, alias = "morning_rate")]
    pub morning_class_rate: RawAmount,
    /// Afternoon class rate.
    #[serde(default, alias = "afternoon_rate")]
    pub afternoon_class_rate: RawAmount,
    /// Evening class rate.
    #[serde(default, alias = "evening_rate")]
    pub evening_class_rate: RawAmount,
    /// Monthly base salary.
    #[serde(default)]
    pub base_salary: RawAmount,
    /// The withholding label.
    #[serde(default, alias = "tax_regime")]
    pub tax_type: String,
}

/// A fully parsed compensation profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationProfile {
    /// The instructor this profile belongs to.
    pub instructor_id: String,
    /// How base pay is derived.
    pub pay_model: PayModel,
    /// How tax is withheld.
    pub tax_regime: TaxRegime,
    /// Problems found while parsing the stored record.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<AuditWarning>,
}

impl CompensationProfile {
    /// Builds a profile from already typed parts.
    pub fn new(instructor_id: impl Into<String>, pay_model: PayModel, tax_regime: TaxRegime) -> Self {
        Self {
            instructor_id: instructor_id.into(),
            pay_model,
            tax_regime,
            warnings: Vec::new(),
        }
    }

    /// Parses a stored instructor row.
    ///
    /// Amounts are coerced with [`RawAmount::coerce`]. An unrecognised pay
    /// model becomes [`PayModel::Unknown`] and an unrecognised tax label
    /// becomes [`TaxRegime::None`]; both are flagged as warnings rather than
    /// rejected.
    pub fn from_record(record: &InstructorRecord) -> Self {
        let mut warnings = Vec::new();

        let hourly_rate = record.hourly_rate.coerce("hourly_rate", &mut warnings);
        let base_salary = record.base_salary.coerce("base_salary", &mut warnings);
        let rates = SlotRates {
            morning: record
                .morning_class_rate
                .coerce("morning_class_rate", &mut warnings),
            afternoon: record
                .afternoon_class_rate
                .coerce("afternoon_class_rate", &mut warnings),
            evening: record
                .evening_class_rate
                .coerce("evening_class_rate", &mut warnings),
        };

        let pay_model = match record.salary_type.trim().to_lowercase().as_str() {
            "hourly" => PayModel::Hourly { hourly_rate },
            "per_class" => PayModel::PerClass { rates, hourly_rate },
            "monthly" => PayModel::Monthly { base_salary },
            "mixed" => PayModel::Mixed { base_salary, rates },
            _ => {
                warn!(
                    instructor_id = %record.id,
                    salary_type = %record.salary_type,
                    "Unrecognised pay model"
                );
                warnings.push(AuditWarning::new(
                    AuditWarning::UNKNOWN_PAY_MODEL,
                    format!(
                        "Unrecognised pay model '{}'; using base salary or hourly rate",
                        record.salary_type
                    ),
                    WarningSeverity::High,
                ));
                PayModel::Unknown {
                    label: record.salary_type.clone(),
                    base_salary,
                    hourly_rate,
                }
            }
        };

        let tax_regime = TaxRegime::from_label(&record.tax_type).unwrap_or_else(|| {
            warn!(
                instructor_id = %record.id,
                tax_type = %record.tax_type,
                "Unrecognised tax regime"
            );
            warnings.push(AuditWarning::new(
                AuditWarning::UNKNOWN_TAX_REGIME,
                format!("Unrecognised tax regime '{}'; nothing withheld", record.tax_type),
                WarningSeverity::High,
            ));
            TaxRegime::None
        });

        Self {
            instructor_id: record.id.clone(),
            pay_model,
            tax_regime,
            warnings,
        }
    }
}
