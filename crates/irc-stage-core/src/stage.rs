//! # Stage Table
//!
//! Static mapping from model class index to a human-readable CKD stage.
//!
//! Indexes outside the table are not an error: they map to
//! [`UNKNOWN_STAGE`] and the prediction is still returned.

use serde::{Deserialize, Serialize};

/// Description returned for any index outside [`STAGES`].
pub const UNKNOWN_STAGE: &str = "Stade inconnu";

/// Stage descriptions, indexed by class (0 = stage 1).
pub const STAGES: [&str; 5] = [
    "Stade 1 - Légère",
    "Stade 2 - Légère à modérée",
    "Stade 3 - Modérée à sévère",
    "Stade 4 - Sévère",
    "Stade 5 - Terminale (IRCT)",
];

/// Describe a class index.
#[must_use]
pub fn describe(index: usize) -> &'static str {
    STAGES.get(index).copied().unwrap_or(UNKNOWN_STAGE)
}

/// The response entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagePrediction {
    /// Class index produced by the model.
    pub predicted_stage: usize,
    /// Description from the stage table.
    pub stage_description: String,
    /// Probability the model assigns to its own prediction, if it can tell.
    pub confidence: Option<f64>,
}

impl StagePrediction {
    /// Build a prediction, resolving the description from the table.
    #[must_use]
    pub fn new(predicted_stage: usize, confidence: Option<f64>) -> Self {
        Self {
            predicted_stage,
            stage_description: describe(predicted_stage).to_string(),
            confidence,
        }
    }

    /// Whether the index fell inside the stage table.
    #[must_use]
    pub fn is_known_stage(&self) -> bool {
        self.predicted_stage < STAGES.len()
    }
}
