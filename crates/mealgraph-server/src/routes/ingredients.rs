//! Ingredient listing route.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/unique_ingredients", get(unique_ingredients))
}

/// GET /unique_ingredients — distinct names, most frequent first.
async fn unique_ingredients(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.ingredients.clone())
}
