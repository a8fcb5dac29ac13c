use crate::server::router::InkstoneState;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

pub mod build;
pub mod posts;
pub mod thoughts;
pub mod uploads;

/// GET /api/health
///
/// Public liveness probe: answers ok only when the store responds.
pub async fn health(State(state): State<InkstoneState>) -> impl IntoResponse {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))),
        Err(e) => {
            tracing::error!(error = %e, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "storage unavailable" })),
            )
        }
    }
}
