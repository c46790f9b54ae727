//! Server error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use flagquiz_core::api::ErrorResponse;
use flagquiz_core::error::ValidationError;

/// A request the service refuses to judge. Always rendered as `400`.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub ValidationError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::debug!("rejected submission: {}", self.0);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::from(&self.0))).into_response()
    }
}

/// Service-level errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listening socket could not be bound.
    #[error("server bind error: {0}")]
    Bind(String),

    /// The accept loop failed.
    #[error("server error: {0}")]
    Serve(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}
