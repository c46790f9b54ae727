pub mod check;
pub mod init;
pub mod play;
pub mod questions;
pub mod serve;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use flagquiz_core::config::{load_config_from, ClientSettings, ValidatorMode};
use flagquiz_core::model::{Progress, QuestionBank};
use flagquiz_core::parser::load_bank;
use flagquiz_core::store::AnswerStore;

/// Everything a player-facing command needs before the first submission.
pub struct QuizSetup {
    pub bank: QuestionBank,
    pub store: Arc<AnswerStore>,
    pub client: ClientSettings,
}

/// Load config, then the bank and client settings, applying CLI overrides.
pub fn load_setup(
    config_path: Option<&Path>,
    questions: Option<PathBuf>,
    server: Option<String>,
) -> Result<QuizSetup> {
    let config = load_config_from(config_path)?;

    let bank = load_bank(questions.or(config.questions).as_deref())?;
    let store = Arc::new(AnswerStore::from_bank(&bank)?);

    let mut client = config.client;
    if let Some(url) = server {
        client.mode = ValidatorMode::Remote;
        client.base_url = Some(url);
    }

    Ok(QuizSetup {
        bank,
        store,
        client,
    })
}

/// Closing remark for a progress snapshot.
///
/// The thresholds are fractions of the 22-question incident bank, scaled to
/// the bank being played.
pub fn rating(progress: &Progress) -> String {
    if !progress.is_complete() {
        return format!(
            "Keep going! {} questions remaining.",
            progress.total - progress.answered_count
        );
    }

    let (score, total) = (progress.score, progress.total);
    if score == total {
        "Perfect! You're an LLM security expert!".to_string()
    } else if score * 22 >= total * 20 {
        "Excellent knowledge of LLM security!".to_string()
    } else if score * 22 >= total * 15 {
        "Good understanding, keep learning!".to_string()
    } else {
        "Study more about LLM vulnerabilities!".to_string()
    }
}
