use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /
/// Liveness check with a fixed message.
pub async fn root_handler() -> Json<Value> {
    Json(json!({ "message": "Resume Analyzer API is running" }))
}

/// GET /health
/// Returns service version and the active scorer.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-analyzer-api",
        "scorer": state.scorer.model_name()
    }))
}
