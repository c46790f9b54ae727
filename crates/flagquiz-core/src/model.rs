//! Core data model types for flagquiz.
//!
//! These are the fundamental types that the entire flagquiz system uses
//! to represent questions, verdicts, and per-session answer records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a question. Any integer is a well-typed id; only the
/// ones present in the answer store are answerable.
pub type QuestionId = i64;

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique, stable identifier.
    pub id: QuestionId,
    /// Text shown to the player.
    pub prompt: String,
    /// The single authoritative answer.
    #[serde(rename = "answer")]
    pub expected_answer: String,
    /// Optional hint the collaborator may reveal.
    #[serde(default)]
    pub hint: Option<String>,
}

/// The full question set, defined once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    /// Unique identifier for this bank.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// Description shown above the questions.
    #[serde(default)]
    pub description: String,
    /// Questions in presentation order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl QuestionBank {
    /// Question ids in presentation order.
    pub fn ids(&self) -> Vec<QuestionId> {
        self.questions.iter().map(|q| q.id).collect()
    }

    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }
}

/// Per-question state in a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    #[default]
    Unanswered,
    Correct,
    Incorrect,
}

impl Verdict {
    /// `Correct` is terminal: no further submissions are accepted.
    pub fn is_terminal(self) -> bool {
        matches!(self, Verdict::Correct)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Unanswered => write!(f, "unanswered"),
            Verdict::Correct => write!(f, "correct"),
            Verdict::Incorrect => write!(f, "incorrect"),
        }
    }
}

/// What the player last submitted for a question and how it was judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: QuestionId,
    /// The trimmed text that was sent to the validator.
    pub raw_submission: String,
    pub verdict: Verdict,
    /// Number of submissions that reached the validator.
    pub attempts: u32,
    /// When the verdict was last applied.
    pub updated_at: DateTime<Utc>,
}

/// Snapshot of a session's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Questions attempted at least once (state is not `Unanswered`).
    pub answered_count: usize,
    /// Questions answered correctly.
    pub score: usize,
    /// Size of the question set.
    pub total: usize,
}

impl Progress {
    /// Every question has at least one judged attempt. Does not imply a
    /// perfect score.
    pub fn is_complete(&self) -> bool {
        self.answered_count == self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Score: {}/{} ({}/{} answered)",
            self.score, self.total, self.answered_count, self.total
        )
    }
}
