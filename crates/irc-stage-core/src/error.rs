//! # Error Types
//!
//! Every failure mode of the core crate, split by the phase it belongs to:
//!
//! - [`LoadError`]: the artifact could not become a [`crate::Model`]
//!   (startup only; the app degrades instead of exiting)
//! - [`ValidationError`]: a record was rejected before reaching the model
//! - [`InferenceError`]: the model failed on a validated record

use std::path::PathBuf;
use thiserror::Error;

// =============================================================================
// LOAD ERRORS
// =============================================================================

/// Failure to turn an artifact file into a usable model.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The artifact file could not be read.
    #[error("failed to read model artifact {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact is not valid JSON or does not match the artifact schema.
    #[error("malformed model artifact: {0}")]
    Json(#[from] serde_json::Error),

    /// The artifact declares a different format tag.
    #[error("unsupported artifact format {found:?} (expected {expected:?})")]
    Format {
        found: String,
        expected: &'static str,
    },

    /// The artifact declares an unsupported schema version.
    #[error("unsupported artifact version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    /// The artifact parsed but is structurally inconsistent.
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

// =============================================================================
// INFERENCE ERRORS
// =============================================================================

/// Failure of a model call on a single feature vector.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError {
    /// The feature vector does not match the model's input width.
    #[error("expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    /// A raw class score came out as NaN or infinite.
    #[error("model produced a non-finite score for class {class}")]
    NonFiniteScore { class: usize },

    /// The probability vector is too short for the predicted class.
    #[error("probability vector has {len} entries, cannot index predicted class {class}")]
    ProbabilityIndex { class: usize, len: usize },

    /// A probability fell outside [0, 1].
    #[error("probability {value} for class {class} lies outside [0, 1]")]
    ProbabilityRange { class: usize, value: f64 },

    /// predict_proba was called on a model without that capability.
    #[error("model does not support probability estimation")]
    ProbabilityUnsupported,
}

// =============================================================================
// VALIDATION ERRORS
// =============================================================================

/// A single field constraint violation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// A required key is absent from the request object.
    #[error("{field}: field required")]
    Missing { field: &'static str },

    /// The key is present but its value has the wrong JSON type.
    #[error("{field}: {message}")]
    WrongType {
        field: &'static str,
        message: String,
    },

    /// A continuous field holds NaN or an infinity.
    #[error("{field}: value must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },

    /// An integer field is outside its inclusive range.
    #[error("{field}: value must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

impl FieldError {
    /// The request key this violation refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::Missing { field }
            | Self::WrongType { field, .. }
            | Self::NotFinite { field, .. }
            | Self::OutOfRange { field, .. } => *field,
        }
    }

    /// Stable machine-readable violation kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Missing { .. } => "missing",
            Self::WrongType { .. } => "type_error",
            Self::NotFinite { .. } => "finite_number",
            Self::OutOfRange { .. } => "range",
        }
    }
}

/// All constraint violations found in one record.
///
/// Never empty: a record with no violations validates successfully.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid clinical record: {}", summarize(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// PIPELINE ERRORS
// =============================================================================

/// Failure of the full record-to-stage pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}
