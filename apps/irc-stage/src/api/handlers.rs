//! HTTP request handlers

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use irc_stage_core::{ClinicalRecord, ModelInfo, StagePrediction, infer_stage};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::error::{ApiError, Result};
use super::state::AppState;

pub const WELCOME_MESSAGE: &str =
    "API de prédiction du stade de l'IRC. Envoyez un dossier clinique en POST sur /predict.";

/// `GET /health` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

pub async fn root() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.model_loaded(),
    })
}

/// Validate, then run the model. Validation comes first so a malformed
/// record is reported as such even while the model is unavailable.
///
/// The body is decoded as a plain JSON object first so that every missing
/// or mistyped key is reported under its own name.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<StagePrediction>> {
    let Json(body) = payload?;
    let Value::Object(fields) = body else {
        return Err(ApiError::MalformedBody("request body must be a JSON object".to_string()));
    };
    let record = ClinicalRecord::from_json_object(&fields)?;
    record.validate()?;

    let model = state.model().ok_or(ApiError::ModelUnavailable)?;
    let prediction = infer_stage(model, &record.features())?;

    info!(
        predicted_stage = prediction.predicted_stage,
        stage = %prediction.stage_description,
        confidence = ?prediction.confidence,
        "Prediction served"
    );
    Ok(Json(prediction))
}

pub async fn model_info(State(state): State<Arc<AppState>>) -> Result<Json<ModelInfo>> {
    let model = state.model().ok_or(ApiError::ModelUnavailable)?;
    Ok(Json(model.info()))
}
