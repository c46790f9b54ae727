//! The `flagquiz play` command.
//!
//! A line-oriented stand-in for the browser form: one question at a time,
//! a verdict after each answer, and a running score.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use flagquiz_client::create_validator;
use flagquiz_core::model::{QuestionBank, Verdict};
use flagquiz_core::session::QuizSession;
use flagquiz_core::state::{SkipReason, SubmitOutcome};

use super::{load_setup, rating};

/// What the player typed at the prompt.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Hint,
    Skip,
    Progress,
    Reset,
    Quit,
    Answer(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        ":hint" | ":h" => Input::Hint,
        ":skip" | ":s" => Input::Skip,
        ":progress" | ":p" => Input::Progress,
        ":reset" => Input::Reset,
        ":quit" | ":q" => Input::Quit,
        _ => Input::Answer(line),
    }
}

pub async fn execute(
    server: Option<String>,
    questions: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let setup = load_setup(config_path.as_deref(), questions, server)?;
    let validator = create_validator(&setup.client, setup.store.clone())?;
    let mut session =
        QuizSession::new(setup.bank.ids(), validator).with_timeout(setup.client.timeout());

    print_banner(&setup.bank);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut cursor = 0;

    loop {
        let Some((idx, id)) = session.state().next_open(cursor) else {
            break;
        };
        let Some(question) = setup.bank.get(id) else {
            break;
        };

        println!();
        println!("[{}/{}] {}", idx + 1, setup.bank.questions.len(), question.prompt);
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Hint => match &question.hint {
                Some(hint) => println!("Hint: {hint}"),
                None => println!("No hint for this question."),
            },
            Input::Skip => cursor = idx + 1,
            Input::Progress => println!("{}", session.progress()),
            Input::Reset => {
                session.reset();
                cursor = 0;
                println!("Quiz reset.");
            }
            Input::Answer(text) => {
                match session.submit(id, text).await {
                    SubmitOutcome::Judged(Verdict::Correct) => {
                        println!("Correct!");
                        cursor = idx + 1;
                    }
                    SubmitOutcome::Judged(_) => println!("Incorrect! Try again."),
                    SubmitOutcome::Skipped(SkipReason::EmptySubmission) => {
                        println!("Type an answer, or :hint, :skip, :progress, :reset, :quit.");
                        continue;
                    }
                    SubmitOutcome::Skipped(reason) => {
                        println!("Skipped: {reason}");
                        continue;
                    }
                }
                println!("{}", session.progress());
            }
        }
    }

    let progress = session.progress();
    println!();
    println!("{progress}");
    println!("{}", rating(&progress));

    Ok(())
}

fn print_banner(bank: &QuestionBank) {
    println!("{}", bank.title);
    if !bank.description.is_empty() {
        println!("{}", bank.description);
    }
    println!(
        "{} questions. Commands: :hint, :skip, :progress, :reset, :quit",
        bank.questions.len()
    );
}
