//! CodeCoach token server library logic.
//!
//! Issues LiveKit join tokens to voice clients: `POST /token` exchanges a room
//! and identity for a signed credential. `GET /health` reports liveness.

pub mod config;

use axum::{
    body::Bytes,
    extract::DefaultBodyLimit,
    http::{header, Method, StatusCode},
    routing::{get, post},
    Extension, Json, Router,
};
use codecoach_types::{TokenRequest, TokenResponse};
use codecoach_voice::TokenIssuer;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Request bodies are two short strings.
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Signs LiveKit join tokens.
    pub issuer: TokenIssuer,
}

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn error_response(message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message.into() })),
    )
}

/// Issues a join token.
///
/// Missing `room` or `identity` fields are generated from the current time.
/// Any failure, including an unparseable body, is a `500` with an `error`
/// message.
async fn token_handler(
    Extension(state): Extension<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<TokenResponse>, (StatusCode, Json<Value>)> {
    let request: TokenRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "rejecting malformed token request");
        error_response(e.to_string())
    })?;

    let now = chrono::Utc::now().timestamp();
    let room = request
        .room
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| format!("codecoach-{now}"));
    let identity = request
        .identity
        .filter(|i| !i.is_empty())
        .unwrap_or_else(|| format!("user-{now}"));

    let token = state.issuer.issue(&room, &identity).map_err(|e| {
        tracing::error!(error = %e, %room, "failed to issue join token");
        error_response(e.to_string())
    })?;

    tracing::info!(%room, %identity, "issued join token");
    Ok(Json(TokenResponse {
        token,
        room: Some(room),
        identity: Some(identity),
    }))
}

/// Builds the application router with all routes.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/token", post(token_handler))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(Extension(Arc::new(state)))
}

/// Initializes the global tracing subscriber from logging config.
///
/// Falls back to `info` when the configured filter does not parse.
pub fn init_tracing(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
