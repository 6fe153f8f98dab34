//! JSON model artifact.
//!
//! ```json
//! {
//!   "format": "irc-model",
//!   "version": 1,
//!   "feature_names": ["uree", "creatinine", "..."],
//!   "model": { "kind": "gradient_boosting", "n_classes": 5, "...": "..." }
//! }
//! ```
//!
//! Every structural check runs here, at load time, so a model that loads
//! can only fail per request on numeric grounds.

use super::{GradientBoostingModel, GradientBoostingSpec, LinearModel, LinearSpec, Model};
use crate::error::LoadError;
use crate::record::FEATURE_NAMES;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format tag every artifact must carry.
pub const ARTIFACT_FORMAT: &str = "irc-model";

/// Current artifact schema version.
pub const ARTIFACT_VERSION: u32 = 1;

/// The model payload, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    GradientBoosting(GradientBoostingSpec),
    Linear(LinearSpec),
}

/// On-disk model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub version: u32,
    pub feature_names: Vec<String>,
    pub model: ModelSpec,
}

impl ModelArtifact {
    /// Wrap a spec with the current header and feature layout.
    #[must_use]
    pub fn new(model: ModelSpec) -> Self {
        Self {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            model,
        }
    }

    /// Parse an artifact from JSON text.
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse an artifact file.
    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Serialize as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Validate the header and build the runnable model.
    pub fn into_model(self) -> Result<Model, LoadError> {
        if self.format != ARTIFACT_FORMAT {
            return Err(LoadError::Format {
                found: self.format,
                expected: ARTIFACT_FORMAT,
            });
        }
        if self.version != ARTIFACT_VERSION {
            return Err(LoadError::Version {
                found: self.version,
                expected: ARTIFACT_VERSION,
            });
        }
        let declared = self.feature_names.iter().map(String::as_str);
        if declared.ne(FEATURE_NAMES) {
            return Err(LoadError::Invalid(format!(
                "feature layout {:?} does not match expected {:?}",
                self.feature_names, FEATURE_NAMES
            )));
        }

        match self.model {
            ModelSpec::GradientBoosting(spec) => {
                Ok(Model::new(GradientBoostingModel::from_spec(spec)?))
            }
            ModelSpec::Linear(spec) => Ok(Model::new(LinearModel::from_spec(spec)?)),
        }
    }
}

/// Read, parse and validate the artifact at `path`.
pub fn load_model(path: &Path) -> Result<Model, LoadError> {
    ModelArtifact::read(path)?.into_model()
}
