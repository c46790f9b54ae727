//! TOML question bank parser.
//!
//! Loads question banks from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Question, QuestionBank, QuestionId};

/// Intermediate TOML structure for parsing question bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    quiz: TomlBankHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: QuestionId,
    prompt: String,
    answer: String,
    #[serde(default)]
    hint: Option<String>,
}

const LLM_POISONING: &str = include_str!("../banks/llm-poisoning.toml");
const LLM_SECURITY_BASICS: &str = include_str!("../banks/llm-security-basics.toml");

/// Parse a single TOML file into a `QuestionBank`.
pub fn parse_question_bank(path: &Path) -> Result<QuestionBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read question bank: {}", path.display()))?;

    parse_question_bank_str(&content, path)
}

/// Parse a TOML string into a `QuestionBank` (useful for testing).
pub fn parse_question_bank_str(content: &str, source_path: &Path) -> Result<QuestionBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            prompt: q.prompt.trim().to_string(),
            expected_answer: q.answer,
            hint: q.hint.filter(|h| !h.trim().is_empty()),
        })
        .collect();

    Ok(QuestionBank {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        questions,
    })
}

/// Recursively load all `.toml` question banks from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuestionBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_question_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Load a bank from `path` (file or directory), or the built-in default.
///
/// A directory must contain exactly one bank.
pub fn load_bank(path: Option<&Path>) -> Result<QuestionBank> {
    let Some(path) = path else {
        return builtin_bank();
    };
    if path.is_dir() {
        let mut banks = load_bank_directory(path)?;
        match banks.len() {
            1 => Ok(banks.remove(0)),
            0 => anyhow::bail!("no question banks found in {}", path.display()),
            n => anyhow::bail!(
                "{} contains {n} question banks; point at a single file",
                path.display()
            ),
        }
    } else {
        parse_question_bank(path)
    }
}

/// The default bank: the LLM poisoning incident investigation.
pub fn builtin_bank() -> Result<QuestionBank> {
    parse_question_bank_str(LLM_POISONING, Path::new("<builtin>/llm-poisoning.toml"))
}

/// Every bank compiled into the binary.
pub fn builtin_banks() -> Result<Vec<QuestionBank>> {
    Ok(vec![
        builtin_bank()?,
        parse_question_bank_str(
            LLM_SECURITY_BASICS,
            Path::new("<builtin>/llm-security-basics.toml"),
        )?,
    ])
}

/// A warning from question bank validation.
#[derive(Debug, Clone)]
pub struct BankWarning {
    /// The question id (if applicable).
    pub question_id: Option<QuestionId>,
    /// Warning message.
    pub message: String,
}

/// Validate a question bank for common issues.
pub fn validate_question_bank(bank: &QuestionBank) -> Vec<BankWarning> {
    let mut warnings = Vec::new();

    if bank.questions.is_empty() {
        warnings.push(BankWarning {
            question_id: None,
            message: "bank has no questions".into(),
        });
    }

    // Check for duplicate ids
    let mut seen_ids = std::collections::HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(q.id) {
            warnings.push(BankWarning {
                question_id: Some(q.id),
                message: format!("duplicate question id: {}", q.id),
            });
        }
    }

    for q in &bank.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(BankWarning {
                question_id: Some(q.id),
                message: "prompt is empty".into(),
            });
        }
        // Empty submissions are never sent to the validator.
        if q.expected_answer.trim().is_empty() {
            warnings.push(BankWarning {
                question_id: Some(q.id),
                message: "expected answer is empty; the question can never be answered".into(),
            });
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
id = "test-bank"
title = "Test Bank"
description = "A test bank"

[[questions]]
id = 1
prompt = """
On what date and at what time was the suspicious email received?
"""
answer = "15.04|08:42:10"

[[questions]]
id = 2
prompt = "What is the sender address?"
answer = "no-reply@workday-update-secure.com"
hint = "Look at the From header"
"#;

    #[test]
    fn parse_valid_toml() {
        let bank = parse_question_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.id, "test-bank");
        assert_eq!(bank.title, "Test Bank");
        assert_eq!(bank.questions.len(), 2);
        assert_eq!(
            bank.questions[0].prompt,
            "On what date and at what time was the suspicious email received?"
        );
        assert_eq!(bank.questions[1].hint.as_deref(), Some("Look at the From header"));
        assert!(validate_question_bank(&bank).is_empty());
    }

    #[test]
    fn parse_missing_optional_fields() {
        let toml = r#"
[quiz]
id = "minimal"
title = "Minimal"

[[questions]]
id = 7
prompt = "Which IP?"
answer = "10.8.0.5"
hint = "  "
"#;
        let bank = parse_question_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert!(bank.description.is_empty());
        assert!(bank.questions[0].hint.is_none());
    }

    #[test]
    fn string_ids_are_rejected() {
        let toml = r#"
[quiz]
id = "bad"
title = "Bad"

[[questions]]
id = "one"
prompt = "?"
answer = "x"
"#;
        assert!(parse_question_bank_str(toml, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn validate_duplicate_ids() {
        let toml = r#"
[quiz]
id = "dupes"
title = "Dupes"

[[questions]]
id = 1
prompt = "First"
answer = "a"

[[questions]]
id = 1
prompt = "Second"
answer = "b"
"#;
        let bank = parse_question_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_question_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_blank_answer_and_prompt() {
        let toml = r#"
[quiz]
id = "blank"
title = "Blank"

[[questions]]
id = 5
prompt = " "
answer = "   "
"#;
        let bank = parse_question_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_question_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("prompt is empty")));
        assert!(warnings.iter().any(|w| w.message.contains("never be answered")));
        assert!(warnings.iter().all(|w| w.question_id == Some(5)));
    }

    #[test]
    fn validate_empty_bank() {
        let toml = "[quiz]\nid = \"empty\"\ntitle = \"Empty\"\n";
        let bank = parse_question_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_question_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].question_id.is_none());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_question_bank_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bank.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("broken.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].id, "test-bank");

        let single = load_bank(Some(dir.path())).unwrap();
        assert_eq!(single.id, "test-bank");
    }

    #[test]
    fn load_bank_rejects_ambiguous_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("b.toml"), VALID_TOML).unwrap();
        let err = load_bank(Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("2 question banks"));
    }

    #[test]
    fn builtin_banks_are_clean() {
        let banks = builtin_banks().unwrap();
        assert_eq!(banks.len(), 2);
        for bank in &banks {
            assert!(
                validate_question_bank(bank).is_empty(),
                "builtin bank {} has warnings",
                bank.id
            );
        }
        assert_eq!(banks[0].questions.len(), 22);
        assert_eq!(banks[1].questions.len(), 25);
    }

    #[test]
    fn builtin_default_has_known_answers() {
        let bank = load_bank(None).unwrap();
        assert_eq!(bank.id, "llm-poisoning");
        assert_eq!(
            bank.get(3).unwrap().expected_answer,
            "andrei.popescu|172.18.0.10"
        );
        assert_eq!(bank.get(9).unwrap().expected_answer, "T1110—Brute Force");
    }
}
