//! The `flagquiz init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    write_if_missing(Path::new("flagquiz.toml"), SAMPLE_CONFIG)?;
    write_if_missing(Path::new("questions.toml"), EXAMPLE_BANK)?;

    println!("\nNext steps:");
    println!("  1. Edit questions.toml with your own questions and flags");
    println!("  2. Run: flagquiz validate --questions questions.toml");
    println!("  3. Run: flagquiz serve   (or: flagquiz play)");

    Ok(())
}

fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)?;
        println!("Created {}", path.display());
    }
    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# flagquiz configuration

# Question bank file or directory. Omit to use the built-in bank.
questions = "questions.toml"

[server]
bind = "127.0.0.1:3000"
request_timeout_ms = 5000
body_limit_bytes = 16384

[client]
# "local" judges in-process; "remote" posts to a running `flagquiz serve`.
mode = "local"
# base_url = "http://127.0.0.1:3000"
timeout_ms = 10000
parallelism = 4
"#;

const EXAMPLE_BANK: &str = r#"[quiz]
id = "example"
title = "Example Investigation"
description = "A short example bank to get started"

[[questions]]
id = 1
prompt = "Which IP address sent the first malicious request? [Format: A.B.C.D]"
answer = "10.0.0.7"
hint = "Look at the earliest entry in the access log"

[[questions]]
id = 2
prompt = "What was the name of the tampered file and the user who changed it? [Format: file|user]"
answer = "config.yaml|svc-deploy"

[[questions]]
id = 3
prompt = "Which MITRE ATT&CK technique best describes the initial access? [Format: TXXXX.XXX—Name]"
answer = "T1566.002—Spearphishing Link"
hint = "The entry point was a link in an email"
"#;
