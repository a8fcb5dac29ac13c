use crate::error::InkstoneError;
use crate::server::router::InkstoneState;
use axum::{Json, extract::State};
use serde_json::{Value, json};

/// POST /api/build
///
/// Runs the static-site build and waits for it to finish. While one build is
/// in flight a second trigger gets 409 rather than a second subprocess.
pub async fn trigger_build(
    State(state): State<InkstoneState>,
) -> Result<Json<Value>, InkstoneError> {
    state.build.run().await?;
    Ok(Json(json!({ "status": "Build Complete" })))
}
