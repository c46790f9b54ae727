//! Client error types.

use thiserror::Error;

/// Failures reaching or understanding the validation service.
///
/// Every variant is a boundary failure: the submission was not judged.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request timed out.
    #[error("request timed out after {0}ms")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The service answered with a status the protocol does not define.
    #[error("unexpected response (HTTP {status}): {message}")]
    UnexpectedStatus { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
