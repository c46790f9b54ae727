//! Validation error types.
//!
//! Defined in `flagquiz-core` so the quiz session can downcast and classify
//! validator failures without string matching, whether the validator ran
//! in-process or on the other side of an HTTP boundary.

use thiserror::Error;

use crate::model::QuestionId;

/// Why a request body failed schema validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadDefect {
    /// The body is not JSON at all.
    MalformedJson,
    /// The body is JSON but not an object.
    NotAnObject,
    /// `id` is missing or not an integer.
    IdNotInteger,
    /// `answer` is missing or not a string.
    AnswerNotString,
}

impl std::fmt::Display for PayloadDefect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadDefect::MalformedJson => write!(f, "body is not valid JSON"),
            PayloadDefect::NotAnObject => write!(f, "body is not a JSON object"),
            PayloadDefect::IdNotInteger => write!(f, "`id` must be an integer"),
            PayloadDefect::AnswerNotString => write!(f, "`answer` must be a string"),
        }
    }
}

/// A submission the validator refused to judge.
///
/// Neither variant is a wrong answer: both indicate a defect on the calling
/// side and must never be reported as `correct: false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Malformed or mistyped input. No lookup was attempted.
    #[error("invalid payload: {0}")]
    InvalidPayload(PayloadDefect),

    /// The id has no entry in the answer store.
    #[error("unknown question: {0}")]
    UnknownQuestion(QuestionId),
}

impl ValidationError {
    /// The message exposed on the wire in `{"error": ...}` bodies.
    pub fn public_message(&self) -> &'static str {
        match self {
            ValidationError::InvalidPayload(PayloadDefect::MalformedJson) => BAD_REQUEST,
            ValidationError::InvalidPayload(_) => INVALID_PAYLOAD,
            ValidationError::UnknownQuestion(_) => UNKNOWN_QUESTION,
        }
    }
}

pub const BAD_REQUEST: &str = "Bad request";
pub const INVALID_PAYLOAD: &str = "Invalid payload";
pub const UNKNOWN_QUESTION: &str = "Unknown question";

/// Why a submission did not produce a verdict.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmitFailure {
    /// The validator rejected the submission.
    #[error(transparent)]
    Rejected(#[from] ValidationError),

    /// The validator could not be reached or did not answer in time.
    #[error("boundary failure: {0}")]
    Boundary(String),
}

impl SubmitFailure {
    /// Classify an error returned by an `AnswerValidator`.
    pub fn classify(err: anyhow::Error) -> Self {
        match err.downcast::<ValidationError>() {
            Ok(rejected) => SubmitFailure::Rejected(rejected),
            Err(other) => SubmitFailure::Boundary(format!("{other:#}")),
        }
    }

    /// Short label used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SubmitFailure::Rejected(ValidationError::InvalidPayload(_)) => "invalid_payload",
            SubmitFailure::Rejected(ValidationError::UnknownQuestion(_)) => "unknown_question",
            SubmitFailure::Boundary(_) => "boundary_failure",
        }
    }
}
