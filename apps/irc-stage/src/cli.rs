//! # CLI
//!
//! clap-based commands for the `irc-stage` binary.
//!
//! - `serve`: run the HTTP server (the default when no command is given)
//! - `predict`: run one ClinicalRecord JSON file through a model, offline
//! - `inspect`: load an artifact and print its metadata

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use irc_stage_core::{
    ClinicalRecord, LoadError, ModelInfo, PredictError, StagePrediction, load_model, predict_stage,
};
use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::api::run_server;
use crate::config::ServerConfig;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to read input {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Predict(#[from] PredictError),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

// =============================================================================
// ARGUMENTS
// =============================================================================

#[derive(Debug, Parser)]
#[command(
    name = "irc-stage",
    version,
    about = "Chronic kidney disease stage prediction service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP prediction server
    Serve {
        /// Bind host (overrides IRC_HOST)
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides IRC_PORT)
        #[arg(long)]
        port: Option<u16>,
        /// Model artifact path (overrides IRC_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Allowed CORS origin (overrides IRC_CORS_ORIGIN)
        #[arg(long)]
        cors_origin: Option<String>,
    },
    /// Predict the stage of one clinical record stored as JSON
    Predict {
        /// Model artifact path (overrides IRC_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,
        /// ClinicalRecord JSON file
        #[arg(long)]
        input: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load a model artifact and print its metadata
    Inspect {
        /// Model artifact path (overrides IRC_MODEL_PATH)
        #[arg(long)]
        model: Option<PathBuf>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    /// Dispatch to the selected command.
    pub async fn run(self) -> Result<(), CliError> {
        let mut config = ServerConfig::from_env();

        match self.command {
            None => cmd_serve(config).await,
            Some(Commands::Serve {
                host,
                port,
                model,
                cors_origin,
            }) => {
                if let Some(host) = host {
                    config.host = host;
                }
                if let Some(port) = port {
                    config.port = port;
                }
                if let Some(model) = model {
                    config.model_path = model;
                }
                if cors_origin.is_some() {
                    config.cors_origin = cors_origin;
                }
                cmd_serve(config).await
            }
            Some(Commands::Predict { model, input, json }) => {
                let model_path = model.unwrap_or(config.model_path);
                cmd_predict(&model_path, &input, json).map(|_| ())
            }
            Some(Commands::Inspect { model, json }) => {
                let model_path = model.unwrap_or(config.model_path);
                cmd_inspect(&model_path, json).map(|_| ())
            }
        }
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Run the HTTP server until shutdown.
pub async fn cmd_serve(config: ServerConfig) -> Result<(), CliError> {
    run_server(config).await?;
    Ok(())
}

/// Read a ClinicalRecord from `input`, predict with the model at
/// `model_path`, and print the result.
///
/// Unlike the server, a model that fails to load is a hard error here.
pub fn cmd_predict(
    model_path: &Path,
    input: &Path,
    json: bool,
) -> Result<StagePrediction, CliError> {
    let model = load_model(model_path)?;

    let text = std::fs::read_to_string(input).map_err(|source| CliError::Input {
        path: input.to_path_buf(),
        source,
    })?;
    let record = match serde_json::from_str(&text)? {
        Value::Object(fields) => {
            ClinicalRecord::from_json_object(&fields).map_err(PredictError::from)?
        }
        other => serde_json::from_value(other)?,
    };

    let prediction = predict_stage(&model, &record)?;
    info!(
        predicted_stage = prediction.predicted_stage,
        input = %input.display(),
        "Offline prediction complete"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&prediction)?);
    } else {
        println!("Stade prédit: {}", prediction.predicted_stage);
        println!("Description: {}", prediction.stage_description);
        match prediction.confidence {
            Some(confidence) => println!("Confiance: {:.2}%", confidence * 100.0),
            None => println!("Confiance: (non disponible)"),
        }
    }

    Ok(prediction)
}

/// Load the model at `model_path` and print its metadata.
pub fn cmd_inspect(model_path: &Path, json: bool) -> Result<ModelInfo, CliError> {
    let info = load_model(model_path)?.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Model: {}", model_path.display());
        println!("  Kind:                 {}", info.kind);
        println!("  Classes:              {}", info.n_classes);
        println!("  Features:             {}", info.n_features);
        println!("  Supports probability: {}", info.supports_probability);
        println!("  Feature order:        {}", info.feature_names.join(", "));
    }

    Ok(info)
}
