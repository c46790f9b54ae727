//! The `flagquiz questions` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, ContentArrangement, Table};

use flagquiz_core::parser::load_bank;

pub fn execute(questions: Option<PathBuf>) -> Result<()> {
    let bank = load_bank(questions.as_deref())?;

    println!("{} [{}]", bank.title, bank.id);
    if !bank.description.is_empty() {
        println!("{}", bank.description);
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["ID", "Question", "Hint"]);

    for q in &bank.questions {
        table.add_row(vec![
            Cell::new(q.id),
            Cell::new(&q.prompt),
            Cell::new(q.hint.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
    println!("{} questions", bank.questions.len());

    Ok(())
}
