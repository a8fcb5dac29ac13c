use crate::error::InkstoneError;
use crate::server::router::InkstoneState;
use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::{Value, json};

/// POST /api/upload
///
/// Accepts a multipart body with a single `file` field and writes it to the
/// upload directory as `{unix_millis}-{original name}`. Collisions require
/// two same-named uploads within one millisecond, which single-operator
/// traffic does not produce.
pub async fn upload(
    State(state): State<InkstoneState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, InkstoneError> {
    let mut filename: Option<String> = None;
    let mut data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| InkstoneError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().map(sanitize_filename);
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| InkstoneError::Validation(format!("Read error: {e}")))?
                    .to_vec(),
            );
        }
        // ignore unknown fields
    }

    let filename = filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| InkstoneError::Validation("Missing file in multipart form".to_string()))?;
    let data =
        data.ok_or_else(|| InkstoneError::Validation("Missing file data in multipart form".to_string()))?;

    let name = format!("{}-{}", Utc::now().timestamp_millis(), filename);

    tokio::fs::create_dir_all(state.upload_dir.as_ref()).await?;
    tokio::fs::write(state.upload_dir.join(&name), &data).await?;

    Ok(Json(json!({ "success": true, "url": format!("/api/uploads/{name}") })))
}

/// GET /api/uploads/{name}
///
/// Serves raw bytes back out of the upload directory. The name segment is
/// validated before it touches the filesystem; anything that could walk out
/// of the directory is rejected outright.
pub async fn serve_upload(
    State(state): State<InkstoneState>,
    Path(name): Path<String>,
) -> Result<Response, InkstoneError> {
    if !is_safe_asset_name(&name) {
        return Err(InkstoneError::Validation("invalid asset name".to_string()));
    }

    let path = state.upload_dir.join(&name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(InkstoneError::NotFound);
        }
        Err(e) => return Err(e.into()),
    };

    Ok(([(CONTENT_TYPE, content_type_for(&name))], bytes).into_response())
}

/// Reduces a client-supplied filename to a single safe path component:
/// everything up to the last separator is dropped, and remaining characters
/// outside `[A-Za-z0-9._-]` become underscores.
fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original)
        .trim_matches('.');

    base.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn is_safe_asset_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

fn content_type_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_plain_names() {
        assert_eq!(sanitize_filename("photo.png"), "photo.png");
        assert_eq!(sanitize_filename("my-shot_2.jpeg"), "my-shot_2.jpeg");
    }

    #[test]
    fn sanitize_drops_directory_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\shot.png"), "shot.png");
    }

    #[test]
    fn sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_filename("my photo (1).png"), "my_photo__1_.png");
    }

    #[test]
    fn asset_names_with_traversal_are_rejected() {
        assert!(is_safe_asset_name("123-photo.png"));
        assert!(!is_safe_asset_name("../secret"));
        assert!(!is_safe_asset_name("a/b.png"));
        assert!(!is_safe_asset_name("a\\b.png"));
        assert!(!is_safe_asset_name(".hidden"));
        assert!(!is_safe_asset_name(""));
    }

    #[test]
    fn content_types_cover_common_images() {
        assert_eq!(content_type_for("1-a.png"), "image/png");
        assert_eq!(content_type_for("1-a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("1-a.bin"), "application/octet-stream");
    }
}
