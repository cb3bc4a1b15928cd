//! The `examkit show` command.

use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examkit_core::organizer::{organize_detail, PartEntry};
use examkit_core::traits::ExamApi;

pub async fn execute(api: Arc<dyn ExamApi>, exam_id: u64) -> Result<()> {
    let detail = api.exam_detail(exam_id).await?;

    println!("{} (exam {})", detail.exam.title, detail.exam.exam_id);
    if !detail.exam.description.is_empty() {
        println!("{}", detail.exam.description);
    }
    println!(
        "{} questions, {} minutes",
        detail.question_count(),
        detail.exam.duration_minutes
    );
    println!();

    let mut table = Table::new();
    table.set_header(vec!["Part", "Questions", "Groups", "Standalone"]);
    for (part, entries) in organize_detail(&detail) {
        let questions: usize = entries.iter().map(|e| e.questions().len()).sum();
        let groups = entries
            .iter()
            .filter(|e| matches!(e, PartEntry::Group(_)))
            .count();
        table.add_row(vec![
            Cell::new(part),
            Cell::new(questions),
            Cell::new(groups),
            Cell::new(entries.len() - groups),
        ]);
    }
    println!("{table}");

    Ok(())
}
