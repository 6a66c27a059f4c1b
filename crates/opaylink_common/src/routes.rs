// --- File: crates/opaylink_common/src/routes.rs ---

use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Creates a router containing the routes shared by every deployment.
pub fn routes() -> Router {
    Router::new().route("/health", get(health_handler))
}
