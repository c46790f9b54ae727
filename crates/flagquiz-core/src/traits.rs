//! Core trait definitions for answer validators.
//!
//! The quiz session only talks to validators through [`AnswerValidator`], so
//! the same state machine runs against the in-process store or the HTTP
//! service implemented in `flagquiz-client`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::model::QuestionId;
use crate::store::AnswerStore;
use crate::validator;

// ---------------------------------------------------------------------------
// Validator trait
// ---------------------------------------------------------------------------

/// Something that can judge a submission for a question.
#[async_trait]
pub trait AnswerValidator: Send + Sync {
    /// Human-readable validator name (e.g. "local").
    fn name(&self) -> &str;

    /// Judge `answer` for question `id`.
    ///
    /// Rejections are returned as a [`crate::error::ValidationError`] inside
    /// the `anyhow::Error` so callers can downcast them; any other error is a
    /// boundary failure.
    async fn validate(&self, id: QuestionId, answer: &str) -> anyhow::Result<bool>;
}

// ---------------------------------------------------------------------------
// In-process validator
// ---------------------------------------------------------------------------

/// Validates directly against a shared [`AnswerStore`].
#[derive(Debug, Clone)]
pub struct LocalValidator {
    store: Arc<AnswerStore>,
}

impl LocalValidator {
    pub fn new(store: Arc<AnswerStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AnswerValidator for LocalValidator {
    fn name(&self) -> &str {
        "local"
    }

    async fn validate(&self, id: QuestionId, answer: &str) -> anyhow::Result<bool> {
        Ok(validator::validate(&self.store, id, answer)?)
    }
}
