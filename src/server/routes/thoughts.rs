use crate::db::{Thought, ThoughtSave};
use crate::error::InkstoneError;
use crate::server::router::InkstoneState;
use axum::extract::rejection::JsonRejection;
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

/// GET /api/thoughts
pub async fn list_thoughts(
    State(state): State<InkstoneState>,
) -> Result<Json<Vec<Thought>>, InkstoneError> {
    let thoughts = state.db.list_thoughts().await?;
    Ok(Json(thoughts))
}

/// POST /api/thought
///
/// Without `id` inserts a new thought; with `id` rewrites content/mood of
/// that row. `created_at` is never touched after insert.
pub async fn save_thought(
    State(state): State<InkstoneState>,
    payload: Result<Json<ThoughtSave>, JsonRejection>,
) -> Result<Json<Value>, InkstoneError> {
    let Json(save) = payload.map_err(|e| InkstoneError::Validation(e.body_text()))?;

    if save.content.trim().is_empty() {
        return Err(InkstoneError::Validation("content is required".to_string()));
    }

    state.db.save_thought(save).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/thought/{id}
pub async fn delete_thought(
    State(state): State<InkstoneState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, InkstoneError> {
    let id: i64 = id
        .parse()
        .map_err(|_| InkstoneError::Validation("invalid thought id".to_string()))?;

    state.db.delete_thought(id).await?;
    Ok(Json(json!({ "success": true })))
}
