//! HTTP endpoint handlers.
//!
//! Room state is only reachable over an authenticated WebSocket session, so HTTP carries
//! nothing beyond liveness.

use axum::Json;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
