use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum InkstoneError {
    #[error("Not Found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Build already in progress")]
    BuildBusy,

    #[error("{0}")]
    BuildFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl IntoResponse for InkstoneError {
    fn into_response(self) -> axum::response::Response {
        let status = match self {
            InkstoneError::NotFound => StatusCode::NOT_FOUND,
            InkstoneError::Validation(_) => StatusCode::BAD_REQUEST,
            InkstoneError::BuildBusy => StatusCode::CONFLICT,

            // Storage and subprocess failures are surfaced verbatim to the
            // operator.
            InkstoneError::BuildFailed(_)
            | InkstoneError::DatabaseError(_)
            | InkstoneError::IoError(_)
            | InkstoneError::JsonError(_)
            | InkstoneError::RactorError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

/// Flat error payload; the admin UI displays the `error` string directly.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_matches_the_wire_contract() {
        assert_eq!(InkstoneError::NotFound.to_string(), "Not Found");
    }

    #[test]
    fn busy_build_reports_conflict_text() {
        assert_eq!(
            InkstoneError::BuildBusy.to_string(),
            "Build already in progress"
        );
    }
}
