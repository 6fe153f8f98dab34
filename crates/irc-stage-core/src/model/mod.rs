//! # Model Module
//!
//! The classifier contract and the shared handle the app layer holds.
//!
//! This module contains:
//! - [`Classifier`]: the interface every model kind implements
//! - [`Model`]: an immutable, `Arc`-backed handle with the probability
//!   capability resolved once at construction
//! - The JSON artifact format and loader ([`ModelArtifact`], [`load_model`])
//! - Two concrete model kinds: gradient-boosted trees and linear

mod artifact;
mod gradient_boosting;
mod linear;

pub use artifact::{ARTIFACT_FORMAT, ARTIFACT_VERSION, ModelArtifact, ModelSpec, load_model};
pub use gradient_boosting::{
    GradientBoostingModel, GradientBoostingSpec, RegressionTree, TreeNode,
};
pub use linear::{LinearModel, LinearSpec};

use crate::error::InferenceError;
use crate::record::FEATURE_NAMES;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// =============================================================================
// CLASSIFIER TRAIT
// =============================================================================

/// A single-record multiclass classifier.
///
/// Implementations must be immutable after construction: they are shared
/// across request handlers without locking.
pub trait Classifier: Send + Sync + fmt::Debug {
    /// Short identifier of the model family.
    fn kind(&self) -> &'static str;

    /// Expected feature vector width.
    fn n_features(&self) -> usize;

    /// Number of output classes.
    fn n_classes(&self) -> usize;

    /// Predict the class index for one feature vector.
    fn predict(&self, features: &[f64]) -> Result<usize, InferenceError>;

    /// Whether [`Classifier::predict_proba`] is implemented.
    fn supports_probability(&self) -> bool {
        false
    }

    /// Per-class probabilities for one feature vector.
    fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        Err(InferenceError::ProbabilityUnsupported)
    }
}

// =============================================================================
// MODEL HANDLE
// =============================================================================

/// Shared, read-only handle to a loaded classifier.
///
/// Cloning is an `Arc` bump.
#[derive(Clone)]
pub struct Model {
    classifier: Arc<dyn Classifier>,
    supports_probability: bool,
}

impl Model {
    /// Wrap a classifier, capturing its probability capability.
    #[must_use]
    pub fn new(classifier: impl Classifier + 'static) -> Self {
        Self::from_arc(Arc::new(classifier))
    }

    /// Wrap an already shared classifier.
    #[must_use]
    pub fn from_arc(classifier: Arc<dyn Classifier>) -> Self {
        let supports_probability = classifier.supports_probability();
        Self {
            classifier,
            supports_probability,
        }
    }

    /// The underlying classifier.
    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Probability capability, fixed at construction.
    #[must_use]
    pub fn supports_probability(&self) -> bool {
        self.supports_probability
    }

    /// Descriptive metadata.
    #[must_use]
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            kind: self.classifier.kind().to_string(),
            n_features: self.classifier.n_features(),
            n_classes: self.classifier.n_classes(),
            supports_probability: self.supports_probability,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.classifier.kind())
            .field("n_classes", &self.classifier.n_classes())
            .field("supports_probability", &self.supports_probability)
            .finish()
    }
}

/// Model metadata exposed by `GET /model` and `irc-stage inspect`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub kind: String,
    pub n_features: usize,
    pub n_classes: usize,
    pub supports_probability: bool,
    pub feature_names: Vec<String>,
}

// =============================================================================
// SHARED NUMERICS
// =============================================================================

pub(crate) fn check_width(features: &[f64], expected: usize) -> Result<(), InferenceError> {
    if features.len() == expected {
        Ok(())
    } else {
        Err(InferenceError::FeatureCount {
            expected,
            got: features.len(),
        })
    }
}

pub(crate) fn check_finite(scores: &[f64]) -> Result<(), InferenceError> {
    match scores.iter().position(|s| !s.is_finite()) {
        Some(class) => Err(InferenceError::NonFiniteScore { class }),
        None => Ok(()),
    }
}

/// Index of the first maximum. Scores must be finite.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

pub(crate) fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

pub(crate) fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Scores for the binary case: a single logit for class 1.
pub(crate) fn binary_scores(logit: f64) -> [f64; 2] {
    [0.0, logit]
}
