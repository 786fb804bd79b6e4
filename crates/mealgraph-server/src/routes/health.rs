//! Health check route.

use std::sync::Arc;

use axum::routing::get;
use axum::{Json, Router};

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(root))
}

/// GET / — liveness message.
async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Hello! This is the KG-based Food Recommendation API."
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{call, get, state};

    #[tokio::test]
    async fn test_root_message() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = call(state(dir.path(), true), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].as_str().unwrap().contains("Recommendation API"));
    }
}
