//! Wire types for `POST /api/quiz`.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::QuestionId;

/// Path of the validation endpoint.
pub const SUBMIT_PATH: &str = "/api/quiz";

/// Request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitRequest {
    pub id: QuestionId,
    pub answer: String,
}

/// `200` response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub correct: bool,
}

/// `400` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&ValidationError> for ErrorResponse {
    fn from(err: &ValidationError) -> Self {
        Self {
            error: err.public_message().to_string(),
        }
    }
}
