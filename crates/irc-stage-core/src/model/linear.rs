//! Linear multiclass models.
//!
//! ```text
//! raw[c] = intercepts[c] + Σ_i weights[c][i] × x[i]
//! ```
//!
//! With two classes a single row gives the logit of class 1. When the
//! artifact marks the model `probabilistic` (logistic regression) the
//! probabilities are the softmax / sigmoid of the raw scores; otherwise
//! (an SVM-style decision function) the model has no probability capability.

use super::{Classifier, argmax, binary_scores, check_finite, check_width, sigmoid, softmax};
use crate::error::{InferenceError, LoadError};
use crate::record::FEATURE_COUNT;
use serde::{Deserialize, Serialize};

/// Serialized form of a linear model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearSpec {
    pub n_classes: usize,
    /// One row of [`FEATURE_COUNT`] coefficients per class (one row when binary).
    pub weights: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
    #[serde(default)]
    pub probabilistic: bool,
}

/// A validated linear classifier.
#[derive(Debug, Clone)]
pub struct LinearModel {
    n_classes: usize,
    weights: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    probabilistic: bool,
}

impl LinearModel {
    /// Validate a spec into a runnable model.
    pub fn from_spec(spec: LinearSpec) -> Result<Self, LoadError> {
        if spec.n_classes < 2 {
            return Err(LoadError::Invalid(format!(
                "linear model needs at least 2 classes, got {}",
                spec.n_classes
            )));
        }
        let rows = if spec.n_classes == 2 {
            1
        } else {
            spec.n_classes
        };
        if spec.weights.len() != rows || spec.intercepts.len() != rows {
            return Err(LoadError::Invalid(format!(
                "expected {rows} weight rows and intercepts, got {} and {}",
                spec.weights.len(),
                spec.intercepts.len()
            )));
        }
        for (c, row) in spec.weights.iter().enumerate() {
            if row.len() != FEATURE_COUNT {
                return Err(LoadError::Invalid(format!(
                    "weight row {c} has {} coefficients, expected {FEATURE_COUNT}",
                    row.len()
                )));
            }
            if row.iter().any(|w| !w.is_finite()) {
                return Err(LoadError::Invalid(format!("weight row {c} is not finite")));
            }
        }
        if spec.intercepts.iter().any(|b| !b.is_finite()) {
            return Err(LoadError::Invalid("intercepts must be finite".to_string()));
        }

        Ok(Self {
            n_classes: spec.n_classes,
            weights: spec.weights,
            intercepts: spec.intercepts,
            probabilistic: spec.probabilistic,
        })
    }

    fn decision_function(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(x, FEATURE_COUNT)?;
        let raw: Vec<f64> = self
            .weights
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| b + row.iter().zip(x).map(|(w, xi)| w * xi).sum::<f64>())
            .collect();
        check_finite(&raw)?;
        Ok(raw)
    }
}

impl Classifier for LinearModel {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict(&self, features: &[f64]) -> Result<usize, InferenceError> {
        let raw = self.decision_function(features)?;
        if self.n_classes == 2 {
            Ok(argmax(&binary_scores(raw[0])))
        } else {
            Ok(argmax(&raw))
        }
    }

    fn supports_probability(&self) -> bool {
        self.probabilistic
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        if !self.probabilistic {
            return Err(InferenceError::ProbabilityUnsupported);
        }
        let raw = self.decision_function(features)?;
        if self.n_classes == 2 {
            let p = sigmoid(raw[0]);
            Ok(vec![1.0 - p, p])
        } else {
            Ok(softmax(&raw))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn unit_row(index: usize, weight: f64) -> Vec<f64> {
        let mut row = vec![0.0; FEATURE_COUNT];
        row[index] = weight;
        row
    }

    fn three_class(probabilistic: bool) -> LinearSpec {
        LinearSpec {
            n_classes: 3,
            weights: vec![unit_row(2, 1.0), unit_row(1, 1.0), unit_row(0, 1.0)],
            intercepts: vec![0.0, 0.0, 0.0],
            probabilistic,
        }
    }

    #[test]
    fn picks_largest_score() {
        let model = LinearModel::from_spec(three_class(true)).unwrap();
        let mut x = [0.0; FEATURE_COUNT];
        x[1] = 5.0;
        assert_eq!(model.predict(&x).unwrap(), 1);
        x[0] = 9.0;
        assert_eq!(model.predict(&x).unwrap(), 2);
    }

    #[test]
    fn decision_function_model_has_no_probabilities() {
        let model = LinearModel::from_spec(three_class(false)).unwrap();
        assert!(!model.supports_probability());
        assert_eq!(
            model.predict_proba(&[0.0; FEATURE_COUNT]),
            Err(InferenceError::ProbabilityUnsupported)
        );
    }

    #[test]
    fn binary_logistic() {
        let spec = LinearSpec {
            n_classes: 2,
            weights: vec![unit_row(6, 0.1)],
            intercepts: vec![-5.0],
            probabilistic: true,
        };
        let model = LinearModel::from_spec(spec).unwrap();
        let mut x = [0.0; FEATURE_COUNT];
        x[6] = 30.0;
        assert_eq!(model.predict(&x).unwrap(), 0);
        x[6] = 80.0;
        assert_eq!(model.predict(&x).unwrap(), 1);
        let probs = model.predict_proba(&x).unwrap();
        assert!(probs[1] > 0.9);
    }

    #[test]
    fn rejects_short_row() {
        let mut spec = three_class(true);
        spec.weights[1].pop();
        assert!(LinearModel::from_spec(spec).is_err());
    }

    #[test]
    fn overflow_is_reported() {
        let spec = LinearSpec {
            n_classes: 3,
            weights: vec![unit_row(0, f64::MAX), unit_row(0, 1.0), unit_row(0, 1.0)],
            intercepts: vec![0.0, 0.0, 0.0],
            probabilistic: true,
        };
        let model = LinearModel::from_spec(spec).unwrap();
        let mut x = [0.0; FEATURE_COUNT];
        x[0] = 10.0;
        assert_eq!(
            model.predict(&x),
            Err(InferenceError::NonFiniteScore { class: 0 })
        );
    }
}
