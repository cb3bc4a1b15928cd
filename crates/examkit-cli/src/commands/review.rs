//! The `examkit review` command.

use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examkit_core::engine::SessionEngine;
use examkit_core::model::QuestionResult;
use examkit_core::review::{ResultFilter, ReviewEntry};
use examkit_core::traits::ExamApi;

pub async fn execute(
    api: Arc<dyn ExamApi>,
    attempt_id: u64,
    filter: ResultFilter,
    explanations: bool,
) -> Result<()> {
    let engine = SessionEngine::new(api);
    let review = engine.load_review(attempt_id).await?;

    let attempt = review.attempt();
    let stats = review.statistics();

    let mut table = Table::new();
    table.set_header(vec!["Listening", "Reading", "Total"]);
    table.add_row(vec![
        Cell::new(attempt.score_listening),
        Cell::new(attempt.score_reading),
        Cell::new(attempt.total_score),
    ]);
    println!("Attempt {attempt_id}");
    println!("{table}");
    println!(
        "{} correct, {} incorrect ({} unanswered) of {} — {}%",
        stats.correct, stats.incorrect, stats.unanswered, stats.total, stats.percentage
    );

    // Filter labels carry their counts, mirroring the result page tabs.
    println!(
        "Showing: {filter} (all {} / correct {} / incorrect {})",
        stats.total, stats.correct, stats.incorrect
    );
    println!();

    let mut explanation_state = review.explanation_state();
    if explanations {
        explanation_state.expand_all();
    }

    for (part, entries) in review.parts() {
        let shown: Vec<(&ReviewEntry, Vec<&QuestionResult>)> = entries
            .iter()
            .map(|e| {
                let results: Vec<&QuestionResult> = e
                    .results()
                    .into_iter()
                    .filter(|r| filter.matches(r))
                    .collect();
                (e, results)
            })
            .filter(|(_, results)| !results.is_empty())
            .collect();
        if shown.is_empty() {
            continue;
        }

        println!("Part {part}");
        for (entry, results) in shown {
            if let ReviewEntry::Group { group, .. } = entry {
                if let Some(text) = &group.content_text {
                    println!("  {text}");
                }
                if let Some(transcript) = &group.transcript {
                    println!("  Transcript: {transcript}");
                }
            }
            for result in results {
                print_result(result, &explanation_state);
            }
        }
        println!();
    }

    Ok(())
}

fn print_result(
    result: &QuestionResult,
    explanations: &examkit_core::review::ExplanationState,
) {
    let verdict = if result.is_correct {
        "✓"
    } else if result.is_unanswered() {
        "–"
    } else {
        "✗"
    };
    let given = result.user_selected.as_deref().unwrap_or("(no answer)");
    let correct = result.correct_answer.as_deref().unwrap_or("?");
    println!(
        "  {verdict} Q{}: answered {given}, correct {correct}",
        result.question.question_number
    );
    if explanations.is_expanded(result.question.question_id) {
        if let Some(text) = &result.explanation {
            println!("      {text}");
        }
    }
}
