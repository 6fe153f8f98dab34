//! Error types for the HTTP API
//!
//! Every error body has the shape `{"detail": ...}`. Validation failures
//! carry an array of `{loc, msg, type}` entries; everything else a string.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use irc_stage_core::{InferenceError, ValidationError};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Error, Debug)]
pub enum ApiError {
    /// Startup load failed; the server is running degraded.
    #[error("Le modèle n'a pas pu être chargé")]
    ModelUnavailable,

    #[error("Erreur lors de la prédiction: {0}")]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body missing, not JSON, or not a JSON object.
    #[error("{0}")]
    MalformedBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ModelUnavailable | Self::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Validation(_) | Self::MalformedBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    fn detail(&self) -> Value {
        match self {
            Self::Validation(err) => Value::Array(
                err.errors
                    .iter()
                    .map(|e| {
                        json!({
                            "loc": ["body", e.field()],
                            "msg": e.to_string(),
                            "type": e.kind(),
                        })
                    })
                    .collect(),
            ),
            Self::MalformedBody(msg) => json!([{
                "loc": ["body"],
                "msg": msg,
                "type": "json_invalid",
            }]),
            Self::ModelUnavailable | Self::Inference(_) => Value::String(self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::ModelUnavailable => error!("Prediction requested but no model is loaded"),
            Self::Inference(e) => error!(detail = %e, "Inference failed"),
            Self::Validation(e) => warn!(detail = %e, "Rejected invalid clinical record"),
            Self::MalformedBody(msg) => warn!(detail = %msg, "Rejected malformed request body"),
        }

        let body = Json(json!({ "detail": self.detail() }));
        (self.status(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use irc_stage_core::FieldError;

    #[test]
    fn status_mapping() {
        assert_eq!(
            ApiError::ModelUnavailable.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Inference(InferenceError::ProbabilityUnsupported).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::MalformedBody("missing field".to_string()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn inference_detail_carries_underlying_message() {
        let err = ApiError::Inference(InferenceError::FeatureCount {
            expected: 11,
            got: 3,
        });
        let expected = "Erreur lors de la prédiction: expected 11 features, got 3";
        assert_eq!(err.detail(), Value::String(expected.to_string()));
    }

    #[test]
    fn validation_detail_lists_fields() {
        let err = ApiError::Validation(ValidationError {
            errors: vec![FieldError::OutOfRange {
                field: "sexe",
                value: 3,
                min: 0,
                max: 1,
            }],
        });
        let detail = err.detail();
        assert_eq!(detail[0]["loc"], json!(["body", "sexe"]));
        assert_eq!(detail[0]["type"], "range");
    }

    #[test]
    fn missing_field_detail_points_at_field() {
        let err = ApiError::Validation(ValidationError {
            errors: vec![FieldError::Missing { field: "asthenie" }],
        });
        let detail = err.detail();
        assert_eq!(detail[0]["loc"], json!(["body", "asthenie"]));
        assert_eq!(detail[0]["type"], "missing");
    }
}
