//! The process-wide answer store.

use std::collections::HashMap;

use anyhow::Result;

use crate::model::{QuestionBank, QuestionId};

/// Read-only mapping from question id to expected answer.
///
/// Built once at startup and never mutated afterwards, so it can be shared
/// behind an `Arc` across any number of concurrent validations.
#[derive(Debug, Clone, Default)]
pub struct AnswerStore {
    answers: HashMap<QuestionId, String>,
}

impl AnswerStore {
    /// Build a store from `(id, expected answer)` pairs.
    ///
    /// A repeated id is an operator error and fails construction.
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (QuestionId, S)>,
        S: Into<String>,
    {
        let mut answers = HashMap::new();
        for (id, expected) in entries {
            if answers.insert(id, expected.into()).is_some() {
                anyhow::bail!("duplicate question id in answer store: {id}");
            }
        }
        Ok(Self { answers })
    }

    /// Build a store from every question in a bank.
    pub fn from_bank(bank: &QuestionBank) -> Result<Self> {
        let store = Self::new(
            bank.questions
                .iter()
                .map(|q| (q.id, q.expected_answer.clone())),
        )?;
        tracing::debug!(bank = %bank.id, entries = store.len(), "answer store initialized");
        Ok(store)
    }

    /// The expected answer for `id`, or `None` if the id is not configured.
    pub fn lookup(&self, id: QuestionId) -> Option<&str> {
        self.answers.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.answers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}
