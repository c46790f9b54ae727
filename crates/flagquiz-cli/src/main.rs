//! flagquiz CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "flagquiz",
    version,
    about = "Self-graded security investigation quiz"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the answer-validation HTTP service
    Serve {
        /// Address to bind (e.g. "0.0.0.0:3000")
        #[arg(long)]
        bind: Option<String>,

        /// Question bank file or directory (default: built-in bank)
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Play the quiz in the terminal
    Play {
        /// Validate against a running service instead of locally
        #[arg(long)]
        server: Option<String>,

        /// Question bank file or directory (default: built-in bank)
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade an answer sheet
    Check {
        /// TOML answer sheet with [[answers]] id/answer entries
        #[arg(long)]
        answers: PathBuf,

        /// Validate against a running service instead of locally
        #[arg(long)]
        server: Option<String>,

        /// Question bank file or directory (default: built-in bank)
        #[arg(long)]
        questions: Option<PathBuf>,

        /// Max concurrent validations
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to question bank file or directory
        #[arg(long)]
        questions: PathBuf,
    },

    /// List the questions of a bank (answers are never shown)
    Questions {
        /// Question bank file or directory (default: built-in bank)
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Create starter config and example question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("flagquiz=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            bind,
            questions,
            config,
        } => commands::serve::execute(bind, questions, config).await,
        Commands::Play {
            server,
            questions,
            config,
        } => commands::play::execute(server, questions, config).await,
        Commands::Check {
            answers,
            server,
            questions,
            parallelism,
            format,
            config,
        } => {
            commands::check::execute(answers, server, questions, parallelism, format, config).await
        }
        Commands::Validate { questions } => commands::validate::execute(questions),
        Commands::Questions { questions } => commands::questions::execute(questions),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
