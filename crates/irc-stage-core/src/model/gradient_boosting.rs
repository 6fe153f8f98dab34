//! Gradient-boosted regression trees for multiclass classification.
//!
//! Each boosting stage holds one regression tree per class (one tree total
//! for the binary case). The raw score of class `k` is
//!
//! ```text
//! raw[k] = init_scores[k] + learning_rate * Σ_stage trees[stage][k](x)
//! ```
//!
//! Multiclass probabilities are the softmax of the raw scores. With two
//! classes the single raw score is the logit of class 1.

use super::{Classifier, argmax, binary_scores, check_finite, check_width, sigmoid, softmax};
use crate::error::{InferenceError, LoadError};
use crate::record::FEATURE_COUNT;
use serde::{Deserialize, Serialize};

// =============================================================================
// TREES
// =============================================================================

/// One node of a flat regression tree.
///
/// Split nodes carry `feature`, `threshold`, `left`, `right`.
/// Leaves have `feature = null` and carry `value`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    #[serde(default)]
    pub feature: Option<usize>,
    #[serde(default)]
    pub threshold: f64,
    #[serde(default)]
    pub left: usize,
    #[serde(default)]
    pub right: usize,
    #[serde(default)]
    pub value: f64,
}

impl TreeNode {
    /// A leaf node.
    #[must_use]
    pub fn leaf(value: f64) -> Self {
        Self {
            feature: None,
            threshold: 0.0,
            left: 0,
            right: 0,
            value,
        }
    }

    /// A split node: go `left` when `x[feature] <= threshold`.
    #[must_use]
    pub fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Self {
        Self {
            feature: Some(feature),
            threshold,
            left,
            right,
            value: 0.0,
        }
    }
}

/// A regression tree stored as a flat node array, root at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// A tree with a single leaf.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        Self {
            nodes: vec![TreeNode::leaf(value)],
        }
    }

    /// A depth-one tree.
    #[must_use]
    pub fn stump(feature: usize, threshold: f64, left_value: f64, right_value: f64) -> Self {
        Self {
            nodes: vec![
                TreeNode::split(feature, threshold, 1, 2),
                TreeNode::leaf(left_value),
                TreeNode::leaf(right_value),
            ],
        }
    }

    /// Structural checks. Children must point strictly forward, which
    /// rules out cycles and bounds traversal by the node count.
    fn check(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node.feature {
                None => {
                    if !node.value.is_finite() {
                        return Err(format!("leaf {i} has a non-finite value"));
                    }
                }
                Some(feature) => {
                    if feature >= n_features {
                        return Err(format!(
                            "node {i} splits on feature {feature}, model has {n_features}"
                        ));
                    }
                    if !node.threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [node.left, node.right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(format!("node {i} has invalid child index {child}"));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. Requires a checked tree.
    fn evaluate(&self, x: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            let node = &self.nodes[idx];
            match node.feature {
                None => return node.value,
                Some(feature) => {
                    idx = if x[feature] <= node.threshold {
                        node.left
                    } else {
                        node.right
                    };
                }
            }
        }
    }
}

// =============================================================================
// ENSEMBLE
// =============================================================================

/// Serialized form of a gradient-boosting model, as found in the artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoostingSpec {
    pub n_classes: usize,
    pub learning_rate: f64,
    /// One entry per class (a single entry for the binary case).
    pub init_scores: Vec<f64>,
    /// `trees[stage][k]`, with the same per-stage width as `init_scores`.
    pub trees: Vec<Vec<RegressionTree>>,
}

/// A validated gradient-boosting classifier.
#[derive(Debug, Clone)]
pub struct GradientBoostingModel {
    n_classes: usize,
    learning_rate: f64,
    init_scores: Vec<f64>,
    trees: Vec<Vec<RegressionTree>>,
}

impl GradientBoostingModel {
    /// Validate a spec into a runnable model.
    pub fn from_spec(spec: GradientBoostingSpec) -> Result<Self, LoadError> {
        if spec.n_classes < 2 {
            return Err(LoadError::Invalid(format!(
                "gradient boosting needs at least 2 classes, got {}",
                spec.n_classes
            )));
        }
        if !spec.learning_rate.is_finite() || spec.learning_rate <= 0.0 {
            return Err(LoadError::Invalid(format!(
                "learning rate must be positive and finite, got {}",
                spec.learning_rate
            )));
        }

        let width = score_width(spec.n_classes);
        if spec.init_scores.len() != width {
            return Err(LoadError::Invalid(format!(
                "expected {width} init scores, got {}",
                spec.init_scores.len()
            )));
        }
        if spec.init_scores.iter().any(|s| !s.is_finite()) {
            return Err(LoadError::Invalid("init scores must be finite".to_string()));
        }

        for (stage, trees) in spec.trees.iter().enumerate() {
            if trees.len() != width {
                return Err(LoadError::Invalid(format!(
                    "stage {stage} has {} trees, expected {width}",
                    trees.len()
                )));
            }
            for (k, tree) in trees.iter().enumerate() {
                tree.check(FEATURE_COUNT)
                    .map_err(|e| LoadError::Invalid(format!("stage {stage}, tree {k}: {e}")))?;
            }
        }

        Ok(Self {
            n_classes: spec.n_classes,
            learning_rate: spec.learning_rate,
            init_scores: spec.init_scores,
            trees: spec.trees,
        })
    }

    /// Number of boosting stages.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    /// Raw (pre-link) scores, one per tree column.
    fn decision_function(&self, x: &[f64]) -> Result<Vec<f64>, InferenceError> {
        check_width(x, FEATURE_COUNT)?;
        let mut raw = self.init_scores.clone();
        for stage in &self.trees {
            for (score, tree) in raw.iter_mut().zip(stage) {
                *score += self.learning_rate * tree.evaluate(x);
            }
        }
        check_finite(&raw)?;
        Ok(raw)
    }

    fn is_binary(&self) -> bool {
        self.n_classes == 2
    }
}

impl Classifier for GradientBoostingModel {
    fn kind(&self) -> &'static str {
        "gradient_boosting"
    }

    fn n_features(&self) -> usize {
        FEATURE_COUNT
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict(&self, features: &[f64]) -> Result<usize, InferenceError> {
        let raw = self.decision_function(features)?;
        if self.is_binary() {
            Ok(argmax(&binary_scores(raw[0])))
        } else {
            Ok(argmax(&raw))
        }
    }

    fn supports_probability(&self) -> bool {
        true
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, InferenceError> {
        let raw = self.decision_function(features)?;
        if self.is_binary() {
            let p = sigmoid(raw[0]);
            Ok(vec![1.0 - p, p])
        } else {
            Ok(softmax(&raw))
        }
    }
}

/// Scores per stage: one per class, or a single logit for two classes.
fn score_width(n_classes: usize) -> usize {
    if n_classes == 2 { 1 } else { n_classes }
}
