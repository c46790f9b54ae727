//! flagquiz-client — answer validator integrations.
//!
//! Implements the `AnswerValidator` trait over HTTP against a running
//! flagquiz service, and picks between that and the in-process validator
//! based on configuration.

pub mod config;
pub mod error;
pub mod http;
pub mod mock;

pub use config::create_validator;
pub use error::ClientError;
pub use http::HttpValidator;
pub use mock::MockValidator;
