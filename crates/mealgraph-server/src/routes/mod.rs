//! HTTP route handlers. Same surface the recipe frontend talks to.

pub mod health;
pub mod ingredients;
pub mod oracle;
pub mod recipe;
pub mod recommend;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use mealgraph_core::Error;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(health::routes())
        .merge(recommend::routes())
        .merge(ingredients::routes())
        .merge(recipe::routes())
        .merge(oracle::routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Status code for an error surfaced to a client.
pub(crate) fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NoCriteria => StatusCode::BAD_REQUEST,
        Error::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::RecipeNotFound(_) => StatusCode::NOT_FOUND,
        Error::OracleLoad(_) => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{"detail": ...}` error body.
pub(crate) fn error_response(err: &Error) -> Response {
    (
        status_for(err),
        Json(serde_json::json!({ "detail": err.to_string() })),
    )
        .into_response()
}
