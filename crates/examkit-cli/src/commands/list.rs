//! The `examkit list` command.

use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examkit_core::traits::ExamApi;

pub async fn execute(api: Arc<dyn ExamApi>) -> Result<()> {
    let exams = api.list_exams().await?;

    if exams.is_empty() {
        println!("No exams available.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Type", "Questions", "Duration"]);
    for exam in &exams {
        let exam_type = exam
            .exam_type
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(exam.exam_id),
            Cell::new(&exam.title),
            Cell::new(exam_type),
            Cell::new(exam.total_questions),
            Cell::new(format!("{} min", exam.duration_minutes)),
        ]);
    }
    println!("{table}");
    println!("{} exam(s)", exams.len());

    Ok(())
}
