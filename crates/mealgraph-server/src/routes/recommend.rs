//! Recommendation route.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use mealgraph_core::Error;
use mealgraph_resolve::{map_preferences_to_criteria, MergeMode, Preferences, WeightConfig};

use super::error_response;
use crate::memory;
use crate::state::AppState;

const MAX_TOP_K: i64 = 50;

fn default_top_k() -> i64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    #[serde(flatten)]
    pub preferences: Preferences,
    #[serde(default)]
    pub weights: WeightConfig,
    #[serde(default = "default_top_k")]
    pub top_k: i64,
    /// OR semantics when true, AND otherwise.
    #[serde(default)]
    pub flexible: bool,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/recommend", post(recommend))
}

/// POST /recommend — ranked recipe ids for the given preferences.
async fn recommend(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RecommendRequest>, JsonRejection>,
) -> Response {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            debug!("Rejected recommend body: {}", rejection.body_text());
            return error_response(&Error::InvalidRequest(rejection.body_text()));
        }
    };
    if !(1..=MAX_TOP_K).contains(&req.top_k) {
        return error_response(&Error::InvalidRequest(format!(
            "top_k must be between 1 and {}, got {}",
            MAX_TOP_K, req.top_k
        )));
    }
    if let Err(e) = req.weights.validate() {
        return error_response(&e);
    }

    let criteria = map_preferences_to_criteria(&req.preferences, &req.weights);
    if criteria.is_empty() {
        return error_response(&Error::NoCriteria);
    }
    debug!(
        "Recommend request with {} criteria, resident memory {} MiB",
        criteria.len(),
        memory::resident_mib()
    );
    let started = Instant::now();

    let handle = match state.oracle_handle().await {
        Ok(h) => h,
        Err(e) => return error_response(&e),
    };

    // Cancelled when this handler is dropped (client went away).
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let mode = MergeMode::from_flexible(req.flexible);
    match state
        .aggregator
        .rank_concurrent(handle, criteria, req.top_k as usize, mode, cancel.clone())
        .await
    {
        Ok(ids) => {
            info!(
                "Returning {} recommendations ({:?}) in {} ms",
                ids.len(),
                mode,
                started.elapsed().as_millis()
            );
            debug!("Resident memory after recommend {} MiB", memory::resident_mib());
            Json(ids).into_response()
        }
        Err(e) => error_response(&e),
    }
}
