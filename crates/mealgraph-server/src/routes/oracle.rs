//! Oracle administration routes.

use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use super::error_response;
use crate::memory;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/oracle/status", get(get_status))
        .route("/oracle/reload", post(reload))
}

/// GET /oracle/status — lifecycle phase and vocabulary sizes.
async fn get_status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let status = state.oracle.status();
    Json(serde_json::json!({
        "oracle": status,
        "fan_out": state.aggregator.fan_out(),
        "preload": state.config.preload,
        "recipes": state.catalog.len(),
        "resident_bytes": memory::resident_bytes(),
    }))
}

/// POST /oracle/reload — rebuild the oracle from the exported artifacts.
async fn reload(State(state): State<Arc<AppState>>) -> Response {
    info!("Oracle reload requested");
    match state.reload_oracle().await {
        Ok(handle) => {
            info!(
                "Oracle reloaded ({}), resident memory {} MiB",
                handle.backend(),
                memory::resident_mib()
            );
            Json(serde_json::json!({
                "status": "reloaded",
                "oracle": state.oracle.status(),
            }))
            .into_response()
        }
        Err(e) => error_response(&e),
    }
}
