//! The `flagquiz check` command.
//!
//! Grades a whole answer sheet. Each question's entries are validated in
//! order, while different questions run concurrently, bounded by a
//! semaphore. Verdicts are applied to the quiz state in sheet order once
//! every validation has finished.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use flagquiz_client::create_validator;
use flagquiz_core::error::SubmitFailure;
use flagquiz_core::model::{Progress, QuestionId};
use flagquiz_core::session::judge;
use flagquiz_core::state::{QuizState, SkipReason, SubmitOutcome};
use flagquiz_core::traits::AnswerValidator;

use super::{load_setup, rating};

#[derive(Debug, Deserialize)]
struct AnswerSheet {
    #[serde(default)]
    answers: Vec<SheetEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct SheetEntry {
    id: QuestionId,
    answer: String,
}

#[derive(Debug, Serialize)]
struct GradedEntry {
    id: QuestionId,
    answer: String,
    #[serde(flatten)]
    outcome: SubmitOutcome,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    bank: String,
    validator: String,
    results: Vec<GradedEntry>,
    progress: Progress,
    rating: String,
}

fn parse_answer_sheet(path: &Path) -> Result<Vec<SheetEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer sheet: {}", path.display()))?;
    let sheet: AnswerSheet = toml::from_str(&content)
        .with_context(|| format!("failed to parse answer sheet: {}", path.display()))?;
    Ok(sheet.answers)
}

pub async fn execute(
    answers_path: PathBuf,
    server: Option<String>,
    questions: Option<PathBuf>,
    parallelism: Option<usize>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json"),
        "unknown format '{format}', expected text or json"
    );

    let setup = load_setup(config_path.as_deref(), questions, server)?;
    let parallelism = parallelism.unwrap_or(setup.client.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let entries = parse_answer_sheet(&answers_path)?;
    let validator = create_validator(&setup.client, setup.store.clone())?;

    let mut state = QuizState::new(setup.bank.ids());
    let results = grade(
        &mut state,
        &entries,
        validator.clone(),
        parallelism,
        setup.client.timeout(),
    )
    .await;

    let progress = state.progress();
    let report = CheckReport {
        bank: setup.bank.id.clone(),
        validator: validator.name().to_string(),
        results: entries
            .into_iter()
            .zip(results)
            .map(|(entry, outcome)| GradedEntry {
                id: entry.id,
                answer: entry.answer,
                outcome,
            })
            .collect(),
        progress,
        rating: rating(&progress),
    };

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_report(&report),
    }

    Ok(())
}

/// Validate the admissible entries, then apply the verdicts in sheet order.
///
/// Entries for the same question are validated one after another and stop at
/// the first correct answer; different questions run concurrently. Entries
/// are admitted against the state as it was before grading, so one that
/// follows a correct answer is skipped when its turn comes to be applied.
async fn grade(
    state: &mut QuizState,
    entries: &[SheetEntry],
    validator: Arc<dyn AnswerValidator>,
    parallelism: usize,
    timeout: std::time::Duration,
) -> Vec<SubmitOutcome> {
    let semaphore = Arc::new(Semaphore::new(parallelism));
    let mut pending: Vec<Result<Option<Result<bool, SubmitFailure>>, SkipReason>> =
        Vec::with_capacity(entries.len());
    let mut groups: HashMap<QuestionId, Vec<(usize, String)>> = HashMap::new();
    for (idx, entry) in entries.iter().enumerate() {
        match state.admit(entry.id, &entry.answer) {
            Ok(text) => {
                groups.entry(entry.id).or_default().push((idx, text));
                pending.push(Ok(None));
            }
            Err(reason) => pending.push(Err(reason)),
        }
    }

    let mut futures = FuturesUnordered::new();
    for (id, submissions) in groups {
        let validator = Arc::clone(&validator);
        let semaphore = Arc::clone(&semaphore);

        futures.push(async move {
            let mut judged = Vec::with_capacity(submissions.len());
            for (idx, text) in submissions {
                let result = match semaphore.acquire().await {
                    Ok(_permit) => judge(validator.as_ref(), id, &text, timeout).await,
                    Err(_) => Err(SubmitFailure::Boundary("semaphore closed".to_string())),
                };
                let settled = result == Ok(true);
                judged.push((idx, result));
                if settled {
                    break;
                }
            }
            judged
        });
    }

    while let Some(judged) = futures.next().await {
        for (idx, result) in judged {
            pending[idx] = Ok(Some(result));
        }
    }

    entries
        .iter()
        .zip(pending)
        .map(|(entry, judged)| {
            let result = match judged {
                Err(reason) => return SubmitOutcome::Skipped(reason),
                Ok(Some(result)) => result,
                Ok(None) => Err(SubmitFailure::Boundary(
                    "validation did not complete".to_string(),
                )),
            };
            let text = match state.admit(entry.id, &entry.answer) {
                Ok(text) => text,
                Err(reason) => return SubmitOutcome::Skipped(reason),
            };
            let verdict = match result {
                Ok(correct) => state.apply(entry.id, text, correct),
                Err(failure) => state.apply_failure(entry.id, text, &failure),
            };
            SubmitOutcome::Judged(verdict)
        })
        .collect()
}

fn print_report(report: &CheckReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Answer", "Result"]);

    for entry in &report.results {
        let result = match entry.outcome {
            SubmitOutcome::Judged(verdict) => verdict.to_string(),
            SubmitOutcome::Skipped(reason) => format!("skipped ({reason})"),
        };
        table.add_row(vec![
            Cell::new(entry.id),
            Cell::new(entry.answer.trim()),
            Cell::new(result),
        ]);
    }

    println!("{table}");
    println!();
    println!("{}", report.progress);
    println!("{}", report.rating);
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagquiz_client::MockValidator;
    use flagquiz_core::model::Verdict;
    use flagquiz_core::store::AnswerStore;
    use flagquiz_core::traits::LocalValidator;

    fn validator() -> Arc<dyn AnswerValidator> {
        let store = AnswerStore::new([
            (1, "15.04|08:42:10"),
            (2, "no-reply@workday-update-secure.com"),
            (3, "andrei.popescu|172.18.0.10"),
        ])
        .unwrap();
        Arc::new(LocalValidator::new(Arc::new(store)))
    }

    fn entry(id: QuestionId, answer: &str) -> SheetEntry {
        SheetEntry {
            id,
            answer: answer.to_string(),
        }
    }

    #[tokio::test]
    async fn applies_in_sheet_order() {
        let mut state = QuizState::new([1, 2, 3]);
        let entries = vec![
            entry(1, "wrong"),
            entry(1, "15.04|08:42:10"),
            entry(1, "15.04|08:42:10"),
            entry(2, ""),
            entry(3, " ANDREI.POPESCU|172.18.0.10 "),
            entry(42, "x"),
        ];

        let outcomes = grade(
            &mut state,
            &entries,
            validator(),
            2,
            std::time::Duration::from_secs(5),
        )
        .await;

        assert_eq!(
            outcomes,
            vec![
                SubmitOutcome::Judged(Verdict::Incorrect),
                SubmitOutcome::Judged(Verdict::Correct),
                SubmitOutcome::Skipped(SkipReason::AlreadyCorrect),
                SubmitOutcome::Skipped(SkipReason::EmptySubmission),
                SubmitOutcome::Judged(Verdict::Correct),
                SubmitOutcome::Skipped(SkipReason::NotInQuiz),
            ]
        );
        assert_eq!(state.record(1).unwrap().attempts, 2);
        assert_eq!(
            state.progress(),
            Progress {
                answered_count: 2,
                score: 2,
                total: 3
            }
        );
    }

    #[tokio::test]
    async fn stops_validating_a_question_once_correct() {
        let mock = Arc::new(MockValidator::new(HashMap::from([(1, "a".to_string())])));
        let mut state = QuizState::new([1]);
        let entries = vec![entry(1, "a"), entry(1, "a"), entry(1, "a")];

        let outcomes = grade(
            &mut state,
            &entries,
            mock.clone(),
            4,
            std::time::Duration::from_secs(5),
        )
        .await;

        assert_eq!(mock.call_count(), 1);
        assert_eq!(
            outcomes,
            vec![
                SubmitOutcome::Judged(Verdict::Correct),
                SubmitOutcome::Skipped(SkipReason::AlreadyCorrect),
                SubmitOutcome::Skipped(SkipReason::AlreadyCorrect),
            ]
        );
        assert_eq!(state.record(1).unwrap().attempts, 1);
    }

    #[tokio::test]
    async fn wrong_attempts_before_the_right_one_are_all_validated() {
        let mock = Arc::new(MockValidator::new(HashMap::from([(1, "a".to_string())])));
        let mut state = QuizState::new([1]);
        let entries = vec![entry(1, "x"), entry(1, "y"), entry(1, "a"), entry(1, "a")];

        let outcomes = grade(
            &mut state,
            &entries,
            mock.clone(),
            4,
            std::time::Duration::from_secs(5),
        )
        .await;

        assert_eq!(mock.call_count(), 3);
        assert_eq!(
            outcomes,
            vec![
                SubmitOutcome::Judged(Verdict::Incorrect),
                SubmitOutcome::Judged(Verdict::Incorrect),
                SubmitOutcome::Judged(Verdict::Correct),
                SubmitOutcome::Skipped(SkipReason::AlreadyCorrect),
            ]
        );
        assert_eq!(state.record(1).unwrap().attempts, 3);
    }

    #[test]
    fn sheet_parsing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("answers.toml");
        std::fs::write(
            &path,
            r#"
[[answers]]
id = 1
answer = "15.04|08:42:10"

[[answers]]
id = 9
answer = "T1110—Brute Force"
"#,
        )
        .unwrap();

        let entries = parse_answer_sheet(&path).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].id, 9);
        assert_eq!(entries[1].answer, "T1110—Brute Force");
    }

    #[test]
    fn missing_sheet_is_an_error() {
        let err = parse_answer_sheet(Path::new("/definitely/not/answers.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read answer sheet"));
    }
}
