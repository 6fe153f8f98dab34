//! # Predictor
//!
//! The record-to-stage pipeline:
//!
//! 1. validate the record
//! 2. assemble the feature vector
//! 3. predict the class index
//! 4. if the model can, read the probability of that index as confidence
//! 5. map the index through the stage table
//!
//! An index outside the stage table is not an error. A probability vector
//! that cannot be indexed by the predicted class is.

use crate::error::{InferenceError, PredictError};
use crate::model::Model;
use crate::record::ClinicalRecord;
use crate::stage::StagePrediction;

/// Run the whole pipeline on one record.
pub fn predict_stage(
    model: &Model,
    record: &ClinicalRecord,
) -> Result<StagePrediction, PredictError> {
    record.validate()?;
    infer_stage(model, &record.features()).map_err(PredictError::from)
}

/// Run steps 3 to 5 on an already validated feature vector.
pub fn infer_stage(model: &Model, features: &[f64]) -> Result<StagePrediction, InferenceError> {
    let classifier = model.classifier();
    let index = classifier.predict(features)?;

    let confidence = if model.supports_probability() {
        let probabilities = classifier.predict_proba(features)?;
        let value = *probabilities
            .get(index)
            .ok_or(InferenceError::ProbabilityIndex {
                class: index,
                len: probabilities.len(),
            })?;
        if !(0.0..=1.0).contains(&value) {
            return Err(InferenceError::ProbabilityRange {
                class: index,
                value,
            });
        }
        Some(value)
    } else {
        None
    };

    Ok(StagePrediction::new(index, confidence))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::model::Classifier;
    use crate::stage::UNKNOWN_STAGE;

    /// Scripted classifier: fixed index and optional fixed probabilities.
    #[derive(Debug)]
    struct Scripted {
        index: usize,
        probabilities: Option<Vec<f64>>,
    }

    impl Classifier for Scripted {
        fn kind(&self) -> &'static str {
            "scripted"
        }
        fn n_features(&self) -> usize {
            11
        }
        fn n_classes(&self) -> usize {
            self.probabilities.as_ref().map_or(5, Vec::len)
        }
        fn predict(&self, _features: &[f64]) -> Result<usize, InferenceError> {
            Ok(self.index)
        }
        fn supports_probability(&self) -> bool {
            self.probabilities.is_some()
        }
        fn predict_proba(&self, _features: &[f64]) -> Result<Vec<f64>, InferenceError> {
            self.probabilities
                .clone()
                .ok_or(InferenceError::ProbabilityUnsupported)
        }
    }

    /// Always fails, like a model fed something it cannot handle.
    #[derive(Debug)]
    struct Broken;

    impl Classifier for Broken {
        fn kind(&self) -> &'static str {
            "broken"
        }
        fn n_features(&self) -> usize {
            11
        }
        fn n_classes(&self) -> usize {
            5
        }
        fn predict(&self, _features: &[f64]) -> Result<usize, InferenceError> {
            Err(InferenceError::NonFiniteScore { class: 0 })
        }
    }

    fn record() -> ClinicalRecord {
        ClinicalRecord {
            uree: 0.5,
            creatinine: 15.0,
            hemoglobine: 10.5,
            sodium: 138.0,
            potassium: 4.8,
            calcium: 2.1,
            age: 70,
            sexe: 1,
            asthenie: 1,
            systole: 150.0,
            etat_general: 3,
        }
    }

    #[test]
    fn stage_three_with_confidence() {
        let model = Model::new(Scripted {
            index: 2,
            probabilities: Some(vec![0.05, 0.1, 0.7, 0.1, 0.05]),
        });
        let prediction = predict_stage(&model, &record()).unwrap();
        assert_eq!(prediction.predicted_stage, 2);
        assert_eq!(prediction.stage_description, "Stade 3 - Modérée à sévère");
        assert_eq!(prediction.confidence, Some(0.7));
    }

    #[test]
    fn no_probability_capability_yields_null_confidence() {
        let model = Model::new(Scripted {
            index: 2,
            probabilities: None,
        });
        let prediction = predict_stage(&model, &record()).unwrap();
        assert_eq!(prediction.predicted_stage, 2);
        assert_eq!(prediction.confidence, None);
    }

    #[test]
    fn unknown_index_still_succeeds() {
        let model = Model::new(Scripted {
            index: 6,
            probabilities: Some(vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0]),
        });
        let prediction = predict_stage(&model, &record()).unwrap();
        assert_eq!(prediction.predicted_stage, 6);
        assert_eq!(prediction.stage_description, UNKNOWN_STAGE);
        assert_eq!(prediction.confidence, Some(1.0));
    }

    #[test]
    fn short_probability_vector_is_an_error() {
        let model = Model::new(Scripted {
            index: 4,
            probabilities: Some(vec![0.5, 0.5]),
        });
        assert_eq!(
            predict_stage(&model, &record()),
            Err(PredictError::Inference(InferenceError::ProbabilityIndex { class: 4, len: 2 }))
        );
    }

    #[test]
    fn out_of_range_probability_is_an_error() {
        let model = Model::new(Scripted {
            index: 0,
            probabilities: Some(vec![1.5, -0.5]),
        });
        assert!(matches!(
            predict_stage(&model, &record()),
            Err(PredictError::Inference(InferenceError::ProbabilityRange { .. }))
        ));
    }

    #[test]
    fn invalid_record_never_reaches_model() {
        let model = Model::new(Broken);
        let bad = ClinicalRecord {
            asthenie: 3,
            ..record()
        };
        assert!(matches!(
            predict_stage(&model, &bad),
            Err(PredictError::Validation(_))
        ));
    }

    #[test]
    fn inference_failure_propagates() {
        let model = Model::new(Broken);
        assert_eq!(
            predict_stage(&model, &record()),
            Err(PredictError::Inference(InferenceError::NonFiniteScore { class: 0 }))
        );
    }
}
