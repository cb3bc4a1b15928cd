//! The `examkit take` command.
//!
//! Two modes: batch (an answer file is applied and submitted immediately)
//! and interactive (a prompt loop racing against the countdown task, which
//! auto-submits whatever has been answered when time runs out).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;

use examkit_core::engine::{AutoSubmit, SessionEngine};
use examkit_core::model::Attempt;
use examkit_core::session::ExamSession;
use examkit_core::traits::ExamApi;

pub async fn execute(api: Arc<dyn ExamApi>, exam_id: u64, answers: Option<PathBuf>) -> Result<()> {
    let engine = SessionEngine::new(api);
    let mut session = engine.load_session(exam_id).await?;

    println!(
        "Started '{}': {} questions, {} minutes",
        session.detail().exam.title,
        session.progress().total,
        session.detail().exam.duration_minutes
    );

    if let Some(path) = answers {
        apply_answer_file(&mut session, &path)?;
        let progress = session.progress();
        println!(
            "Applied answer file: {}/{} answered",
            progress.answered, progress.total
        );
        let attempt = engine
            .submit(&mut session)
            .await?
            .context("submission was already in progress")?;
        print_attempt(&attempt);
        return Ok(());
    }

    interactive(engine, session).await
}

/// Answer file shape: a `[answers]` table keyed by question number.
#[derive(serde::Deserialize)]
struct AnswerFile {
    answers: HashMap<String, String>,
}

fn apply_answer_file(session: &mut ExamSession, path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read answer file: {}", path.display()))?;
    let file: AnswerFile = toml::from_str(&content)
        .with_context(|| format!("failed to parse answer file: {}", path.display()))?;

    for (key, answer) in file.answers {
        let number: u32 = key
            .parse()
            .with_context(|| format!("answer key is not a question number: {key}"))?;
        match session.question_by_number(number).map(|q| q.question_id) {
            Some(id) => {
                session.record_answer(id, answer);
            }
            None => tracing::warn!(number, "answer file references a question the exam lacks"),
        }
    }
    Ok(())
}

async fn interactive(engine: SessionEngine, session: ExamSession) -> Result<()> {
    println!("Commands: part <n> | answer <question> <choice> | status | submit | quit");
    let session = Arc::new(Mutex::new(session));
    let (auto, mut expired) = AutoSubmit::spawn(session.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            outcome = &mut expired => {
                // An Err means the timer task shut down without expiring;
                // that must not trigger a submission, and the spent channel
                // must not be polled again.
                if outcome.is_err() {
                    return retry_loop(&engine, &session, &mut lines).await;
                }
                println!("Time is up — submitting your answers.");
                let terminal = {
                    let mut guard = session.lock().await;
                    match engine.submit(&mut guard).await {
                        Ok(Some(attempt)) => print_attempt(&attempt),
                        Ok(None) => {}
                        Err(e) => println!("Submission failed: {e}. Run `submit` to retry."),
                    }
                    guard.status().is_terminal()
                };
                if terminal {
                    return Ok(());
                }
                // The expiry signal fires once; from here only retries and
                // quitting remain.
                return retry_loop(&engine, &session, &mut lines).await;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed; the attempt is abandoned.
                    return Ok(());
                };
                let mut guard = session.lock().await;
                match run_command(&engine, &mut guard, line.trim()).await? {
                    Loop::Continue => {}
                    Loop::Submitted => {
                        auto.cancel();
                        return Ok(());
                    }
                    Loop::Quit => {
                        println!("Attempt abandoned; nothing was submitted.");
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn retry_loop(
    engine: &SessionEngine,
    session: &Arc<Mutex<ExamSession>>,
    lines: &mut tokio::io::Lines<BufReader<tokio::io::Stdin>>,
) -> Result<()> {
    while let Some(line) = lines.next_line().await? {
        let mut guard = session.lock().await;
        match run_command(engine, &mut guard, line.trim()).await? {
            Loop::Continue => {}
            Loop::Submitted => return Ok(()),
            Loop::Quit => {
                println!("Attempt abandoned; nothing was submitted.");
                return Ok(());
            }
        }
    }
    Ok(())
}

enum Loop {
    Continue,
    Submitted,
    Quit,
}

async fn run_command(
    engine: &SessionEngine,
    session: &mut ExamSession,
    line: &str,
) -> Result<Loop> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("part") => match words.next().and_then(|w| w.parse::<u32>().ok()) {
            Some(part) => match session.select_part(part) {
                Ok(()) => print_part(session, part),
                Err(e) => println!("{e}"),
            },
            None => println!("usage: part <n>"),
        },
        Some("answer") => {
            let number = words.next().and_then(|w| w.parse::<u32>().ok());
            let choice = words.next();
            match (number, choice) {
                (Some(number), Some(choice)) => match session.question_by_number(number) {
                    Some(q) => {
                        let id = q.question_id;
                        if session.record_answer(id, choice) {
                            let p = session.progress();
                            println!("Q{number} = {choice} ({}/{} answered)", p.answered, p.total);
                        } else {
                            println!("Answer not recorded.");
                        }
                    }
                    None => println!("No question {number} in this exam."),
                },
                _ => println!("usage: answer <question> <choice>"),
            }
        }
        Some("status") => print_status(session),
        Some("submit") => {
            match engine.submit(session).await {
                Ok(Some(attempt)) => {
                    print_attempt(&attempt);
                    return Ok(Loop::Submitted);
                }
                Ok(None) => println!("A submission is already in progress."),
                Err(e) => println!("Submission failed: {e}. Run `submit` to retry."),
            }
        }
        Some("quit") => return Ok(Loop::Quit),
        Some(other) => println!("Unknown command: {other}"),
        None => {}
    }
    Ok(Loop::Continue)
}

fn print_part(session: &ExamSession, part: u32) {
    if let Some(entries) = session.parts().get(&part) {
        println!("Part {part}:");
        for entry in entries {
            for q in entry.questions() {
                let marker = match session.answer_for(q.question_id) {
                    Some(a) => format!("[{a}]"),
                    None => "[ ]".to_string(),
                };
                let text = q.question_text.as_deref().unwrap_or("(listening item)");
                println!("  {marker} Q{}: {text}", q.question_number);
                if !q.options.is_empty() {
                    println!("       {}", q.options.join(" / "));
                }
            }
        }
    }
}

fn print_status(session: &ExamSession) {
    let p = session.progress();
    let mins = session.remaining_secs() / 60;
    let secs = session.remaining_secs() % 60;
    let warning = if session.is_time_critical() {
        " (time critical)"
    } else {
        ""
    };
    println!(
        "Part {} | {}/{} answered ({}%) | {mins:02}:{secs:02} left{warning} | started {}",
        session.current_part(),
        p.answered,
        p.total,
        p.percent,
        session.started_at().format("%H:%M:%S UTC")
    );
}

fn print_attempt(attempt: &Attempt) {
    println!("Attempt {} submitted.", attempt.attempt_id);
    println!(
        "Listening {} | Reading {} | Total score {}",
        attempt.score_listening, attempt.score_reading, attempt.total_score
    );
    println!(
        "Run `examkit review {}` to see the graded questions.",
        attempt.attempt_id
    );
}
