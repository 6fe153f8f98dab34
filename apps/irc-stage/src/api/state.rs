//! Application state shared across handlers

use std::path::Path;

use irc_stage_core::{Model, load_model};
use tracing::{error, info};

/// The loaded model, or nothing when startup loading failed.
///
/// Built once before the router and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    model: Option<Model>,
}

impl AppState {
    pub fn with_model(model: Model) -> Self {
        Self { model: Some(model) }
    }

    /// State of a server whose model failed to load.
    pub fn degraded() -> Self {
        Self { model: None }
    }

    /// Load the artifact at `path`. A failure is logged and yields a
    /// degraded state; it is never retried.
    pub fn load(path: &Path) -> Self {
        match load_model(path) {
            Ok(model) => {
                let info = model.info();
                info!(
                    path = %path.display(),
                    kind = %info.kind,
                    n_classes = info.n_classes,
                    supports_probability = info.supports_probability,
                    "Model loaded"
                );
                Self::with_model(model)
            }
            Err(e) => {
                error!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load model, serving in degraded mode"
                );
                Self::degraded()
            }
        }
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }
}
