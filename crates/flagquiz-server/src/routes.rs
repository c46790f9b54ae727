//! Router and request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use flagquiz_core::api::{SubmitResponse, SUBMIT_PATH};
use flagquiz_core::config::ServerSettings;
use flagquiz_core::store::AnswerStore;
use flagquiz_core::validator;

use crate::error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<AnswerStore>,
}

/// Build the HTTP router with its middleware stack.
pub fn build_router(state: AppState, settings: &ServerSettings) -> Router {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(RequestBodyLimitLayer::new(settings.body_limit_bytes))
        // Innermost: `Timeout` needs a `Default` response body from what it wraps.
        .layer(TimeoutLayer::new(settings.request_timeout()));

    Router::new()
        .route(SUBMIT_PATH, post(submit_answer))
        .route("/health", get(health_check))
        .layer(middleware)
        .with_state(state)
}

/// Judge one submission.
///
/// The body is taken as raw bytes so malformed JSON and mistyped fields are
/// rejected by the schema check here, never by an extractor with its own
/// error format.
async fn submit_answer(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let correct = validator::validate_body(&state.store, &body)?;

    tracing::debug!(correct, "submission judged");
    Ok(Json(SubmitResponse { correct }))
}

async fn health_check() -> &'static str {
    "ok"
}
