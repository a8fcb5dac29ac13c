use crate::db::{Post, PostUpsert};
use crate::error::InkstoneError;
use crate::server::router::InkstoneState;
use axum::extract::rejection::JsonRejection;
use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

/// GET /api/posts
pub async fn list_posts(
    State(state): State<InkstoneState>,
) -> Result<Json<Vec<Post>>, InkstoneError> {
    let posts = state.db.list_posts().await?;
    Ok(Json(posts))
}

/// GET /api/post/{slug}
pub async fn get_post(
    State(state): State<InkstoneState>,
    Path(slug): Path<String>,
) -> Result<Json<Post>, InkstoneError> {
    match state.db.get_post(slug).await? {
        Some(post) => Ok(Json(post)),
        None => Err(InkstoneError::NotFound),
    }
}

/// POST /api/post
///
/// Upsert keyed on slug: a repeated slug updates the stored post in place
/// and keeps its original `created_at`.
pub async fn upsert_post(
    State(state): State<InkstoneState>,
    payload: Result<Json<PostUpsert>, JsonRejection>,
) -> Result<Json<Value>, InkstoneError> {
    let Json(upsert) = payload.map_err(|e| InkstoneError::Validation(e.body_text()))?;

    if upsert.slug.trim().is_empty() {
        return Err(InkstoneError::Validation("slug is required".to_string()));
    }
    if upsert.title.trim().is_empty() {
        return Err(InkstoneError::Validation("title is required".to_string()));
    }

    state.db.upsert_post(upsert).await?;
    Ok(Json(json!({ "success": true })))
}

/// DELETE /api/post/{slug}
///
/// Succeeds even when the slug no longer exists.
pub async fn delete_post(
    State(state): State<InkstoneState>,
    Path(slug): Path<String>,
) -> Result<Json<Value>, InkstoneError> {
    state.db.delete_post(slug).await?;
    Ok(Json(json!({ "success": true })))
}
