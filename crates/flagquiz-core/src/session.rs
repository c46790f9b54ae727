//! Quiz session driver.
//!
//! Couples one [`QuizState`] with an [`AnswerValidator`]. The validator call is
//! awaited under a timeout before any transition is applied, and every
//! failure ends in an `Incorrect` transition rather than an error.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::error::SubmitFailure;
use crate::model::{Progress, QuestionId, Verdict};
use crate::state::{QuizState, SubmitOutcome};
use crate::traits::AnswerValidator;

/// Default time to wait for a verdict.
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Ask `validator` about one admitted submission, giving up after `timeout`.
///
/// Errors the validator returns are classified; an expired timeout is a
/// boundary failure.
pub async fn judge(
    validator: &dyn AnswerValidator,
    id: QuestionId,
    text: &str,
    timeout: Duration,
) -> Result<bool, SubmitFailure> {
    match tokio::time::timeout(timeout, validator.validate(id, text)).await {
        Ok(Ok(correct)) => Ok(correct),
        Ok(Err(e)) => Err(SubmitFailure::classify(e)),
        Err(_) => Err(SubmitFailure::Boundary(format!(
            "{} validator did not answer within {}ms",
            validator.name(),
            timeout.as_millis()
        ))),
    }
}

/// One player's pass through a question set.
pub struct QuizSession {
    id: Uuid,
    state: QuizState,
    validator: Arc<dyn AnswerValidator>,
    timeout: Duration,
}

impl QuizSession {
    pub fn new(
        question_ids: impl IntoIterator<Item = QuestionId>,
        validator: Arc<dyn AnswerValidator>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: QuizState::new(question_ids),
            validator,
            timeout: DEFAULT_VALIDATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> &QuizState {
        &self.state
    }

    pub fn progress(&self) -> Progress {
        self.state.progress()
    }

    pub fn verdict(&self, id: QuestionId) -> Verdict {
        self.state.verdict(id)
    }

    pub fn reset(&mut self) {
        tracing::info!(session = %self.id, "quiz reset");
        self.state.reset();
    }

    /// Submit `raw_text` for question `id`.
    ///
    /// Skipped submissions cause no validator call. If this future is dropped
    /// before the validator answers, the question keeps its previous state.
    pub async fn submit(&mut self, id: QuestionId, raw_text: &str) -> SubmitOutcome {
        let text = match self.state.admit(id, raw_text) {
            Ok(text) => text,
            Err(reason) => {
                tracing::debug!(session = %self.id, question_id = id, %reason, "submission skipped");
                return SubmitOutcome::Skipped(reason);
            }
        };

        let result = judge(self.validator.as_ref(), id, &text, self.timeout).await;
        let verdict = match result {
            Ok(correct) => self.state.apply(id, text, correct),
            Err(failure) => self.state.apply_failure(id, text, &failure),
        };
        tracing::debug!(
            session = %self.id,
            question_id = id,
            %verdict,
            score = self.state.score(),
            "submission judged"
        );
        SubmitOutcome::Judged(verdict)
    }
}
