use crate::config::Config;
use crate::db::DbActorHandle;
use crate::server::guards::AdminGuard;
use crate::server::routes;
use crate::service::BuildRunner;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Request},
    http::{
        Method, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
    },
    middleware::{self, Next},
    response::Response,
    routing::{delete, get, post},
};
use serde_json::json;
use std::{path::PathBuf, sync::Arc, time::Duration, time::Instant};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct InkstoneState {
    pub db: DbActorHandle,
    pub admin_secret: Arc<str>,
    pub upload_dir: Arc<PathBuf>,
    pub build: BuildRunner,
}

impl InkstoneState {
    pub fn new(db: DbActorHandle, cfg: &Config) -> Self {
        let build = BuildRunner::new(
            cfg.build_command.clone(),
            cfg.site_dir.clone(),
            Duration::from_secs(cfg.build_timeout_secs),
        );

        Self {
            db,
            admin_secret: Arc::from(cfg.admin_secret.as_str()),
            upload_dir: Arc::new(cfg.upload_dir.clone()),
            build,
        }
    }
}

async fn not_found_handler() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not Found" })))
}

async fn access_log(req: Request, next: Next) -> Response {
    // Capture request metadata before moving `req` into the handler stack.
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let resp = next.run(req).await;

    let status = resp.status();
    let latency_ms = start.elapsed().as_millis() as u64;

    if status.is_server_error() {
        error!(
            "| {:>3} | {:^7} | {} | {}ms | {}",
            status.as_u16(),
            method.as_str(),
            path,
            latency_ms,
            user_agent
        );
    } else if status.is_client_error() {
        warn!(
            "| {:>3} | {:^7} | {} | {}ms | {}",
            status.as_u16(),
            method.as_str(),
            path,
            latency_ms,
            user_agent
        );
    } else {
        info!(
            "| {:>3} | {:^7} | {} | {}ms | {}",
            status.as_u16(),
            method.as_str(),
            path,
            latency_ms,
            user_agent
        );
    }

    resp
}

/// Every response, success or failure, carries the same permissive CORS
/// header set; the admin UI is served from a different origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
}

pub fn inkstone_router(state: InkstoneState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/health", get(routes::health))
        .route("/api/posts", get(routes::posts::list_posts))
        .route(
            "/api/post/{slug}",
            get(routes::posts::get_post).delete(routes::posts::delete_post),
        )
        .route("/api/post", post(routes::posts::upsert_post))
        .route("/api/thoughts", get(routes::thoughts::list_thoughts))
        .route("/api/thought", post(routes::thoughts::save_thought))
        .route("/api/thought/{id}", delete(routes::thoughts::delete_thought))
        .route("/api/upload", post(routes::uploads::upload))
        .route("/api/uploads/{name}", get(routes::uploads::serve_upload))
        .route("/api/build", post(routes::build::trigger_build))
        .fallback(not_found_handler)
        // Guard first, so denied requests never reach a handler; CORS
        // outside the guard, so even a 401 carries the headers.
        .layer(middleware::from_extractor_with_state::<AdminGuard, _>(
            state.clone(),
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(cors_layer())
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}
