//! # HTTP API
//!
//! axum router for the prediction service.
//!
//! | route          | handler                   |
//! |----------------|---------------------------|
//! | `GET /`        | welcome message           |
//! | `GET /health`  | liveness + model status   |
//! | `POST /predict`| ClinicalRecord → stage    |
//! | `GET /model`   | loaded model metadata     |

mod error;
mod handlers;
mod state;

pub use error::ApiError;
pub use handlers::{HealthResponse, WELCOME_MESSAGE};
pub use state::AppState;

use std::sync::Arc;

use axum::{
    Json,
    Router,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

use crate::config::ServerConfig;

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": "Not Found" })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "detail": "Method Not Allowed" })),
    )
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        Some(origin) if origin != "*" => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                warn!(origin = %origin, "Invalid CORS origin, allowing any origin");
                layer.allow_origin(Any)
            }
        },
        _ => layer.allow_origin(Any),
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/model", get(handlers::model_info))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405)
        .with_state(state)
        .layer(cors_layer(config.cors_origin.as_deref()))
        .layer(TraceLayer::new_for_http())
}

/// Resolves on ctrl-c or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install ctrl-c handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("Shutdown signal received, stopping server gracefully");
}

/// Load the model, bind, and serve until a shutdown signal.
///
/// A model that fails to load does not stop the server.
pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let state = Arc::new(AppState::load(&config.model_path));
    if !state.model_loaded() {
        warn!("Predictions will fail until the server is restarted with a valid model");
    }

    let app = create_router(state, &config);

    info!(address = %config.address(), "Binding HTTP listener");
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port)).await?;
    let address = listener.local_addr()?;
    info!(
        address = %address,
        model_path = %config.model_path.display(),
        pid = std::process::id(),
        "IRC stage server listening"
    );
    info!(url = %format!("http://{}/health", address), "Health endpoint available");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down cleanly");
    Ok(())
}
