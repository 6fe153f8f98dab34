//! # Clinical Record
//!
//! The request entity: 11 mandatory clinical measurements for one patient.
//!
//! The serde keys are the wire contract (`uree`, `hemoglobine`, `sexe`, ...).
//! Every field is required; there are no defaults. Integer fields accept
//! integral floats (`70.0`) but not fractional ones.
//!
//! Two checking phases:
//! - shape: [`ClinicalRecord::from_json_object`] reports every missing or
//!   mistyped key
//! - range: [`ClinicalRecord::validate`] reports every out-of-range value

use crate::error::{FieldError, ValidationError};
use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// FEATURE LAYOUT
// =============================================================================

/// Width of the model input vector.
pub const FEATURE_COUNT: usize = 11;

/// Model input layout, in vector order.
///
/// A model artifact must declare exactly these names in exactly this order.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "uree",
    "creatinine",
    "hemoglobine",
    "sodium",
    "potassium",
    "calcium",
    "age",
    "sexe",
    "asthenie",
    "systole",
    "etat_general",
];

/// A single-record model input.
pub type FeatureVector = [f64; FEATURE_COUNT];

// =============================================================================
// CLINICAL RECORD
// =============================================================================

/// One patient's measurements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClinicalRecord {
    /// Urea (g/L).
    pub uree: f64,
    /// Creatinine (mg/L).
    pub creatinine: f64,
    /// Hemoglobin (g/dL).
    pub hemoglobine: f64,
    /// Na+ (meq/L).
    pub sodium: f64,
    /// K+ (meq/L).
    pub potassium: f64,
    /// Ca2+ (meq/L).
    pub calcium: f64,
    /// Age in years.
    #[serde(deserialize_with = "integral")]
    pub age: i64,
    /// Sex (0: female, 1: male).
    #[serde(deserialize_with = "integral")]
    pub sexe: i64,
    /// Asthenia / symptom presence (0: no, 1: yes).
    #[serde(deserialize_with = "integral")]
    pub asthenie: i64,
    /// Systolic blood pressure (mmHg).
    pub systole: f64,
    /// General-state score at admission.
    #[serde(deserialize_with = "integral")]
    pub etat_general: i64,
}

impl ClinicalRecord {
    /// Build a record from a decoded JSON object.
    ///
    /// Unlike `serde_json::from_value`, which stops at the first problem,
    /// this names every missing or mistyped key. Unknown keys are ignored.
    pub fn from_json_object(object: &Map<String, Value>) -> Result<Self, ValidationError> {
        let mut reader = FieldReader {
            object,
            errors: Vec::new(),
        };

        let record = Self {
            uree: reader.number("uree"),
            creatinine: reader.number("creatinine"),
            hemoglobine: reader.number("hemoglobine"),
            sodium: reader.number("sodium"),
            potassium: reader.number("potassium"),
            calcium: reader.number("calcium"),
            age: reader.integer("age"),
            sexe: reader.integer("sexe"),
            asthenie: reader.integer("asthenie"),
            systole: reader.number("systole"),
            etat_general: reader.integer("etat_general"),
        };

        if reader.errors.is_empty() {
            Ok(record)
        } else {
            Err(ValidationError {
                errors: reader.errors,
            })
        }
    }

    /// Check every field constraint and report all violations at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        let continuous = [
            ("uree", self.uree),
            ("creatinine", self.creatinine),
            ("hemoglobine", self.hemoglobine),
            ("sodium", self.sodium),
            ("potassium", self.potassium),
            ("calcium", self.calcium),
            ("systole", self.systole),
        ];
        for (field, value) in continuous {
            if !value.is_finite() {
                errors.push(FieldError::NotFinite { field, value });
            }
        }

        for (field, value) in [("sexe", self.sexe), ("asthenie", self.asthenie)] {
            if !(0..=1).contains(&value) {
                errors.push(FieldError::OutOfRange {
                    field,
                    value,
                    min: 0,
                    max: 1,
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    /// Assemble the model input vector in [`FEATURE_NAMES`] order.
    #[must_use]
    pub fn features(&self) -> FeatureVector {
        [
            self.uree,
            self.creatinine,
            self.hemoglobine,
            self.sodium,
            self.potassium,
            self.calcium,
            self.age as f64,
            self.sexe as f64,
            self.asthenie as f64,
            self.systole,
            self.etat_general as f64,
        ]
    }
}

// =============================================================================
// FIELD DECODING
// =============================================================================

/// Largest magnitude below which every integral f64 is exact.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Accept a JSON integer, or a float with no fractional part.
fn integral<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    if let Some(value) = number.as_i64() {
        return Ok(value);
    }

    let value = number.as_f64().unwrap_or(f64::NAN);
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        Ok(value as i64)
    } else {
        let unexpected = Unexpected::Float(value);
        Err(de::Error::invalid_value(unexpected, &"an integer"))
    }
}

/// Pulls typed fields out of a JSON object, recording every failure.
///
/// A failed field yields a zero placeholder; the record is discarded when
/// any error was recorded.
struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    errors: Vec<FieldError>,
}

impl FieldReader<'_> {
    fn number(&mut self, field: &'static str) -> f64 {
        self.read(field, |value| f64::deserialize(value))
            .unwrap_or_default()
    }

    fn integer(&mut self, field: &'static str) -> i64 {
        self.read(field, |value| integral(value))
            .unwrap_or_default()
    }

    fn read<T>(
        &mut self,
        field: &'static str,
        decode: impl FnOnce(&Value) -> Result<T, serde_json::Error>,
    ) -> Option<T> {
        let Some(value) = self.object.get(field) else {
            self.errors.push(FieldError::Missing { field });
            return None;
        };
        match decode(value) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                self.errors.push(FieldError::WrongType {
                    field,
                    message: e.to_string(),
                });
                None
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
