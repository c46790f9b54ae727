//! The per-session quiz state machine.
//!
//! Each question moves `Unanswered -> {Correct | Incorrect}`. `Incorrect` may
//! be retried any number of times; `Correct` is terminal. The score always
//! equals the number of `Correct` records.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use serde::Serialize;

use crate::error::{SubmitFailure, ValidationError};
use crate::model::{AnswerRecord, Progress, QuestionId, Verdict};

/// Why a submission was ignored without calling the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The text was empty after trimming.
    EmptySubmission,
    /// The question is already `Correct`.
    AlreadyCorrect,
    /// The id is not part of this session's question set.
    NotInQuiz,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::EmptySubmission => write!(f, "empty submission"),
            SkipReason::AlreadyCorrect => write!(f, "already answered correctly"),
            SkipReason::NotInQuiz => write!(f, "question is not part of this quiz"),
        }
    }
}

/// Result of a `submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// No state change happened.
    Skipped(SkipReason),
    /// The validator was consulted and the question moved to this state.
    Judged(Verdict),
}

impl SubmitOutcome {
    pub fn verdict(&self) -> Option<Verdict> {
        match self {
            SubmitOutcome::Judged(v) => Some(*v),
            SubmitOutcome::Skipped(_) => None,
        }
    }
}

/// Progress over a fixed question set for one session.
#[derive(Debug, Clone)]
pub struct QuizState {
    order: Vec<QuestionId>,
    records: HashMap<QuestionId, AnswerRecord>,
    score: usize,
}

impl QuizState {
    /// Start a session over `ids`. Order is kept; repeated ids are dropped.
    pub fn new(ids: impl IntoIterator<Item = QuestionId>) -> Self {
        let mut seen = HashSet::new();
        let order = ids.into_iter().filter(|id| seen.insert(*id)).collect();
        Self {
            order,
            records: HashMap::new(),
            score: 0,
        }
    }

    pub fn question_ids(&self) -> &[QuestionId] {
        &self.order
    }

    pub fn total(&self) -> usize {
        self.order.len()
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.order.contains(&id)
    }

    pub fn verdict(&self, id: QuestionId) -> Verdict {
        self.records
            .get(&id)
            .map(|r| r.verdict)
            .unwrap_or(Verdict::Unanswered)
    }

    pub fn record(&self, id: QuestionId) -> Option<&AnswerRecord> {
        self.records.get(&id)
    }

    /// Records in question order.
    pub fn records(&self) -> impl Iterator<Item = &AnswerRecord> + '_ {
        self.order.iter().filter_map(|id| self.records.get(id))
    }

    /// Check the submission preconditions.
    ///
    /// Returns the trimmed text to send to the validator, or the reason the
    /// submission must be ignored.
    pub fn admit(&self, id: QuestionId, raw_text: &str) -> Result<String, SkipReason> {
        if !self.contains(id) {
            return Err(SkipReason::NotInQuiz);
        }
        if self.verdict(id).is_terminal() {
            return Err(SkipReason::AlreadyCorrect);
        }
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Err(SkipReason::EmptySubmission);
        }
        Ok(trimmed.to_string())
    }

    /// Apply a validator verdict for an admitted submission.
    ///
    /// A question that is already `Correct` is left untouched, so the score
    /// can grow by at most one per question.
    pub fn apply(&mut self, id: QuestionId, submission: String, correct: bool) -> Verdict {
        if !self.contains(id) {
            return Verdict::Unanswered;
        }
        let next = if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };

        let record = self.records.entry(id).or_insert_with(|| AnswerRecord {
            question_id: id,
            raw_submission: String::new(),
            verdict: Verdict::Unanswered,
            attempts: 0,
            updated_at: Utc::now(),
        });
        if record.verdict.is_terminal() {
            return record.verdict;
        }

        record.raw_submission = submission;
        record.attempts += 1;
        record.updated_at = Utc::now();
        record.verdict = next;
        if next == Verdict::Correct {
            self.score += 1;
        }
        next
    }

    /// Apply a failed validation. Every failure degrades to `Incorrect`.
    pub fn apply_failure(
        &mut self,
        id: QuestionId,
        submission: String,
        failure: &SubmitFailure,
    ) -> Verdict {
        tracing::warn!(
            question_id = id,
            kind = failure.kind(),
            "validation failed, recording as incorrect: {failure}"
        );
        self.apply(id, submission, false)
    }

    /// Run one submission through a synchronous validator.
    pub fn submit<F>(&mut self, id: QuestionId, raw_text: &str, validate: F) -> SubmitOutcome
    where
        F: FnOnce(QuestionId, &str) -> Result<bool, ValidationError>,
    {
        let text = match self.admit(id, raw_text) {
            Ok(text) => text,
            Err(reason) => return SubmitOutcome::Skipped(reason),
        };
        let verdict = match validate(id, &text) {
            Ok(correct) => self.apply(id, text, correct),
            Err(rejected) => self.apply_failure(id, text, &SubmitFailure::Rejected(rejected)),
        };
        SubmitOutcome::Judged(verdict)
    }

    /// Forget every record and zero the score.
    pub fn reset(&mut self) {
        self.records.clear();
        self.score = 0;
    }

    pub fn progress(&self) -> Progress {
        Progress {
            answered_count: self
                .records
                .values()
                .filter(|r| r.verdict != Verdict::Unanswered)
                .count(),
            score: self.score,
            total: self.total(),
        }
    }

    /// The first question at or after `from` (wrapping) that is not yet
    /// `Correct`.
    pub fn next_open(&self, from: usize) -> Option<(usize, QuestionId)> {
        let n = self.order.len();
        (0..n)
            .map(|offset| (from + offset) % n)
            .map(|idx| (idx, self.order[idx]))
            .find(|(_, id)| !self.verdict(*id).is_terminal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AnswerStore;
    use crate::validator::validate;

    fn store() -> AnswerStore {
        AnswerStore::new([(1, "prompt injection"), (2, "data poisoning"), (3, "jailbreaking")])
            .unwrap()
    }

    fn check_invariant(state: &QuizState) {
        let correct = state
            .records()
            .filter(|r| r.verdict == Verdict::Correct)
            .count();
        assert_eq!(state.score(), correct);
        assert!(state.score() <= state.total());
    }

    #[test]
    fn fresh_state_is_unanswered() {
        let state = QuizState::new([1, 2, 3]);
        assert_eq!(state.verdict(1), Verdict::Unanswered);
        assert_eq!(
            state.progress(),
            Progress {
                answered_count: 0,
                score: 0,
                total: 3
            }
        );
    }

    #[test]
    fn correct_answer_scores_once() {
        let store = store();
        let mut state = QuizState::new([1, 2, 3]);

        let outcome = state.submit(1, " Prompt Injection ", |id, a| validate(&store, id, a));
        assert_eq!(outcome, SubmitOutcome::Judged(Verdict::Correct));
        assert_eq!(state.score(), 1);

        for _ in 0..5 {
            let again = state.submit(1, "prompt injection", |id, a| validate(&store, id, a));
            assert_eq!(again, SubmitOutcome::Skipped(SkipReason::AlreadyCorrect));
        }
        assert_eq!(state.score(), 1);
        assert_eq!(state.record(1).unwrap().attempts, 1);
        check_invariant(&state);
    }

    #[test]
    fn incorrect_is_retryable() {
        let store = store();
        let mut state = QuizState::new([1, 2, 3]);

        let first = state.submit(2, "data leakage", |id, a| validate(&store, id, a));
        assert_eq!(first, SubmitOutcome::Judged(Verdict::Incorrect));
        let second = state.submit(2, "still wrong", |id, a| validate(&store, id, a));
        assert_eq!(second, SubmitOutcome::Judged(Verdict::Incorrect));
        assert_eq!(state.score(), 0);

        let third = state.submit(2, "data poisoning", |id, a| validate(&store, id, a));
        assert_eq!(third, SubmitOutcome::Judged(Verdict::Correct));

        let record = state.record(2).unwrap();
        assert_eq!(record.attempts, 3);
        assert_eq!(record.raw_submission, "data poisoning");
        check_invariant(&state);
    }

    #[test]
    fn empty_submission_never_reaches_validator() {
        let mut state = QuizState::new([1]);
        let outcome = state.submit(1, "   \t", |_, _| panic!("validator must not be called"));
        assert_eq!(outcome, SubmitOutcome::Skipped(SkipReason::EmptySubmission));
        assert_eq!(state.verdict(1), Verdict::Unanswered);
    }

    #[test]
    fn validator_receives_trimmed_text() {
        let mut state = QuizState::new([1]);
        state.submit(1, "  padded  ", |_, a| {
            assert_eq!(a, "padded");
            Ok(false)
        });
        assert_eq!(state.record(1).unwrap().raw_submission, "padded");
    }

    #[test]
    fn rejections_degrade_to_incorrect() {
        // Question 4 is in the quiz but missing from the store.
        let store = store();
        let mut state = QuizState::new([1, 4]);
        let outcome = state.submit(4, "anything", |id, a| validate(&store, id, a));
        assert_eq!(outcome, SubmitOutcome::Judged(Verdict::Incorrect));
        assert_eq!(state.score(), 0);
        assert_eq!(state.progress().answered_count, 1);
    }

    #[test]
    fn ids_outside_the_quiz_are_skipped() {
        let mut state = QuizState::new([1]);
        let outcome = state.submit(999, "x", |_, _| Ok(true));
        assert_eq!(outcome, SubmitOutcome::Skipped(SkipReason::NotInQuiz));
        assert_eq!(state.apply(999, "x".into(), true), Verdict::Unanswered);
        assert_eq!(state.score(), 0);
    }

    #[test]
    fn apply_after_correct_is_ignored() {
        let mut state = QuizState::new([1]);
        assert_eq!(state.apply(1, "a".into(), true), Verdict::Correct);
        assert_eq!(state.apply(1, "b".into(), false), Verdict::Correct);
        assert_eq!(state.apply(1, "c".into(), true), Verdict::Correct);
        assert_eq!(state.score(), 1);
        assert_eq!(state.record(1).unwrap().raw_submission, "a");
    }

    #[test]
    fn completion_counts_attempts_not_score() {
        let store = store();
        let mut state = QuizState::new([1, 2, 3]);
        state.submit(1, "prompt injection", |id, a| validate(&store, id, a));
        state.submit(2, "nope", |id, a| validate(&store, id, a));
        assert!(!state.progress().is_complete());
        state.submit(3, "nope", |id, a| validate(&store, id, a));

        let progress = state.progress();
        assert!(progress.is_complete());
        assert_eq!(progress.score, 1);
        check_invariant(&state);
    }

    #[test]
    fn reset_clears_everything() {
        let store = store();
        let mut state = QuizState::new([1, 2, 3]);
        state.submit(1, "prompt injection", |id, a| validate(&store, id, a));
        state.submit(2, "wrong", |id, a| validate(&store, id, a));

        state.reset();
        assert_eq!(
            state.progress(),
            Progress {
                answered_count: 0,
                score: 0,
                total: 3
            }
        );
        assert_eq!(state.verdict(1), Verdict::Unanswered);

        // Questions are answerable again after a reset.
        let outcome = state.submit(1, "prompt injection", |id, a| validate(&store, id, a));
        assert_eq!(outcome, SubmitOutcome::Judged(Verdict::Correct));
    }

    #[test]
    fn invariant_holds_over_mixed_sequence() {
        let store = store();
        let mut state = QuizState::new([1, 2, 3]);
        let script = [
            (1, "x"),
            (1, "prompt injection"),
            (1, "prompt injection"),
            (2, ""),
            (2, "data poisoning"),
            (3, "JAILBREAKING"),
            (3, "jailbreaking"),
            (4, "jailbreaking"),
        ];
        for (id, answer) in script {
            state.submit(id, answer, |id, a| validate(&store, id, a));
            check_invariant(&state);
        }
        assert_eq!(state.score(), 3);
    }

    #[test]
    fn next_open_wraps_and_skips_correct() {
        let mut state = QuizState::new([10, 20, 30]);
        assert_eq!(state.next_open(0), Some((0, 10)));
        state.apply(10, "a".into(), true);
        assert_eq!(state.next_open(0), Some((1, 20)));
        state.apply(30, "a".into(), true);
        assert_eq!(state.next_open(2), Some((1, 20)));
        state.apply(20, "a".into(), true);
        assert_eq!(state.next_open(0), None);
    }

    #[test]
    fn duplicate_ids_collapse() {
        let state = QuizState::new([1, 2, 1, 3, 2]);
        assert_eq!(state.question_ids(), &[1, 2, 3]);
        assert_eq!(state.total(), 3);
    }
}
