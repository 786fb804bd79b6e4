//! Recipe lookup route.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/recipe/{id}", get(get_recipe))
}

/// GET /recipe/{id} — the full table row.
async fn get_recipe(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    info!("Fetching recipe {}", id);
    match state.catalog.recipe(&id) {
        Ok(row) => Json(serde_json::Value::Object(row)).into_response(),
        Err(e) => error_response(&e),
    }
}
