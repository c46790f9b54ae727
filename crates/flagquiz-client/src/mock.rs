//! Mock validator for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use flagquiz_core::error::ValidationError;
use flagquiz_core::model::QuestionId;
use flagquiz_core::traits::AnswerValidator;

/// A mock validator for exercising quiz sessions without a real service.
///
/// Judges by exact (un-normalized) lookup in a fixed answer map.
pub struct MockValidator {
    /// Map of question id → accepted answer.
    answers: HashMap<QuestionId, String>,
    /// Never answer, to exercise timeouts.
    hang: bool,
    /// Fail every call as if the service were unreachable.
    unreachable: bool,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last submission received.
    last_submission: Mutex<Option<(QuestionId, String)>>,
}

impl MockValidator {
    /// Create a mock that accepts the given answers.
    pub fn new(answers: HashMap<QuestionId, String>) -> Self {
        Self {
            answers,
            hang: false,
            unreachable: false,
            call_count: AtomicU32::new(0),
            last_submission: Mutex::new(None),
        }
    }

    /// Create a mock whose calls never complete.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new(HashMap::new())
        }
    }

    /// Create a mock whose calls always fail at the transport level.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::new(HashMap::new())
        }
    }

    /// Get the number of calls made to this validator.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last submission made to this validator.
    pub fn last_submission(&self) -> Option<(QuestionId, String)> {
        self.last_submission.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerValidator for MockValidator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn validate(&self, id: QuestionId, answer: &str) -> anyhow::Result<bool> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_submission.lock().unwrap() = Some((id, answer.to_string()));

        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.unreachable {
            anyhow::bail!("mock service unreachable");
        }

        match self.answers.get(&id) {
            Some(expected) => Ok(expected == answer),
            None => Err(ValidationError::UnknownQuestion(id).into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use flagquiz_core::model::Verdict;
    use flagquiz_core::session::QuizSession;
    use flagquiz_core::state::SubmitOutcome;

    fn answers() -> HashMap<QuestionId, String> {
        HashMap::from([(1, "prompt injection".to_string()), (2, "jailbreaking".to_string())])
    }

    #[tokio::test]
    async fn exact_lookup() {
        let mock = MockValidator::new(answers());
        assert!(mock.validate(1, "prompt injection").await.unwrap());
        assert!(!mock.validate(1, "Prompt Injection").await.unwrap());
        assert_eq!(mock.call_count(), 2);
        assert_eq!(
            mock.last_submission(),
            Some((1, "Prompt Injection".to_string()))
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_rejections() {
        let mock = MockValidator::new(answers());
        let err = mock.validate(42, "x").await.unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());
    }

    #[tokio::test]
    async fn session_sends_trimmed_text() {
        let mock = Arc::new(MockValidator::new(answers()));
        let mut session = QuizSession::new([1, 2], mock.clone());
        let outcome = session.submit(2, "   jailbreaking  ").await;
        assert_eq!(outcome, SubmitOutcome::Judged(Verdict::Correct));
        assert_eq!(mock.last_submission(), Some((2, "jailbreaking".to_string())));
    }

    #[tokio::test]
    async fn unreachable_mock_counts_as_incorrect() {
        let mock = Arc::new(MockValidator::unreachable());
        let mut session = QuizSession::new([1], mock.clone());
        let outcome = session.submit(1, "prompt injection").await;
        assert_eq!(outcome, SubmitOutcome::Judged(Verdict::Incorrect));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_mock_hits_session_timeout() {
        let mock = Arc::new(MockValidator::hanging());
        let mut session =
            QuizSession::new([1], mock.clone()).with_timeout(Duration::from_secs(3));
        let outcome = session.submit(1, "prompt injection").await;
        assert_eq!(outcome, SubmitOutcome::Judged(Verdict::Incorrect));
        assert_eq!(session.progress().answered_count, 1);
    }
}
