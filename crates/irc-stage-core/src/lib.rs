//! # IRC Stage Core
//!
//! Pure inference engine behind the IRC (chronic kidney disease) stage
//! prediction service.
//!
//! The data flow is linear:
//!
//! ```text
//! ClinicalRecord ──validate──► [f64; 11] ──Classifier::predict──► class index
//!                                         └─Classifier::predict_proba──► confidence
//! class index ──stage::describe──► "Stade 3 - Modérée à sévère"
//! ```
//!
//! This crate performs no network I/O and holds no global state. A loaded
//! [`Model`] is immutable and cheap to clone (it wraps an `Arc`), so the
//! app layer shares a single instance across all request handlers.

pub mod error;
pub mod model;
pub mod predictor;
pub mod record;
pub mod stage;

pub use error::{FieldError, InferenceError, LoadError, PredictError, ValidationError};
pub use model::{
    ARTIFACT_FORMAT, ARTIFACT_VERSION, Classifier, GradientBoostingModel, GradientBoostingSpec,
    LinearModel, LinearSpec, Model, ModelArtifact, ModelInfo, ModelSpec, RegressionTree, TreeNode,
    load_model,
};
pub use predictor::{infer_stage, predict_stage};
pub use record::{ClinicalRecord, FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
pub use stage::{STAGES, StagePrediction, UNKNOWN_STAGE, describe};
