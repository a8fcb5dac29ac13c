use crate::server::router::InkstoneState;
use axum::{
    Json,
    extract::FromRequestParts,
    http::{Method, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use serde_json::json;
use subtle::ConstantTimeEq;

fn extract_bearer_token(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// The one authorization decision per request, layered over the whole
/// router: safe methods pass (the static-site build fetches content without
/// credentials), everything else must carry the admin bearer secret.
/// Handlers never re-check credentials.
#[derive(Debug, Clone, Copy)]
pub struct AdminGuard;

impl FromRequestParts<InkstoneState> for AdminGuard {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &InkstoneState,
    ) -> Result<Self, Self::Rejection> {
        if matches!(parts.method, Method::GET | Method::HEAD | Method::OPTIONS) {
            return Ok(AdminGuard);
        }

        match extract_bearer_token(&parts.headers) {
            Some(token) => {
                let expected = state.admin_secret.as_ref();
                if token.as_bytes().ct_eq(expected.as_bytes()).into() {
                    Ok(AdminGuard)
                } else {
                    Err(AuthError)
                }
            }
            None => Err(AuthError),
        }
    }
}

/// Missing and wrong credentials are deliberately indistinguishable on the
/// wire.
pub struct AuthError;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
    }
}
