//! flagquiz-core — Answer store, validator, and quiz state machine.
//!
//! This crate defines the question model, the read-only answer store, the
//! normalization-based validator, and the per-session state machine that the
//! rest of flagquiz builds on.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod session;
pub mod state;
pub mod store;
pub mod traits;
pub mod validator;

pub use error::{PayloadDefect, SubmitFailure, ValidationError};
pub use model::{AnswerRecord, Progress, Question, QuestionBank, QuestionId, Verdict};
pub use session::{judge, QuizSession};
pub use state::{QuizState, SkipReason, SubmitOutcome};
pub use store::AnswerStore;
pub use traits::{AnswerValidator, LocalValidator};
