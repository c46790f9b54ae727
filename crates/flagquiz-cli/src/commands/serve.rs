//! The `flagquiz serve` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use flagquiz_core::config::load_config_from;
use flagquiz_core::parser::{load_bank, validate_question_bank};
use flagquiz_core::store::AnswerStore;
use flagquiz_server::QuizServer;

pub async fn execute(
    bind: Option<String>,
    questions: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let bank = load_bank(questions.or(config.questions).as_deref())?;
    for w in validate_question_bank(&bank) {
        tracing::warn!(question_id = ?w.question_id, "{}", w.message);
    }
    let store = Arc::new(AnswerStore::from_bank(&bank)?);

    let mut settings = config.server;
    if let Some(bind) = bind {
        settings.bind = bind;
    }

    tracing::info!(bank = %bank.id, "serving {} ({} questions)", bank.title, store.len());
    let server = QuizServer::bind(&settings, store)
        .await
        .context("failed to start quiz service")?;
    server.run().await?;

    Ok(())
}
