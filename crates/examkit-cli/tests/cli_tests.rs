//! CLI integration tests using assert_cmd against a mock exam server.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn examkit() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("examkit").unwrap()
}

fn catalog_body() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": [{
            "exam_id": 1,
            "title": "TOEIC Practice 1",
            "duration_minutes": 120,
            "total_questions": 2,
            "type": "readlis"
        }]
    })
}

fn detail_body() -> serde_json::Value {
    serde_json::json!({
        "success": true,
        "data": {
            "exam_id": 1,
            "title": "TOEIC Practice 1",
            "duration_minutes": 120,
            "total_questions": 2,
            "type": "readlis",
            "standalone_questions": [
                {
                    "question_id": 11,
                    "part_number": 5,
                    "question_number": 101,
                    "question_text": "The manager _____ the report.",
                    "options": ["reviewed", "review", "reviews", "reviewing"]
                },
                {
                    "question_id": 12,
                    "part_number": 5,
                    "question_number": 102,
                    "question_text": "Deliveries arrive _____ noon.",
                    "options": ["at", "on", "in", "by"]
                }
            ]
        }
    })
}

#[test]
fn help_output() {
    examkit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("TOEIC practice exams"));
}

#[test]
fn version_output() {
    examkit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("examkit"));
}

#[test]
fn invalid_filter_is_rejected() {
    examkit()
        .arg("review")
        .arg("5")
        .arg("--filter")
        .arg("wrong")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown filter"));
}

#[test]
fn unreachable_server_reports_error() {
    examkit()
        .arg("--base-url")
        .arg("http://127.0.0.1:1")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn list_renders_catalog() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
        .mount(&server)
        .await;

    examkit()
        .arg("--base-url")
        .arg(server.uri())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("TOEIC Practice 1"))
        .stdout(predicate::str::contains("readlis"))
        .stdout(predicate::str::contains("1 exam(s)"));
}

#[tokio::test(flavor = "multi_thread")]
async fn base_url_env_var_is_honored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exams"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_body()))
        .mount(&server)
        .await;

    examkit()
        .env("EXAMKIT_BASE_URL", server.uri())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("TOEIC Practice 1"));
}

#[tokio::test(flavor = "multi_thread")]
async fn show_prints_part_breakdown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exams"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body()))
        .mount(&server)
        .await;

    examkit()
        .arg("--base-url")
        .arg(server.uri())
        .arg("show")
        .arg("1")
        .assert()
        .success()
        .stdout(predicate::str::contains("TOEIC Practice 1"))
        .stdout(predicate::str::contains("2 questions, 120 minutes"));
}

#[tokio::test(flavor = "multi_thread")]
async fn show_missing_exam_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exams"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    examkit()
        .arg("--base-url")
        .arg(server.uri())
        .arg("show")
        .arg("42")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn take_with_answer_file_submits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exams"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/exams/submit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "attempt_id": 77,
                "score_listening": 0,
                "score_reading": 10,
                "total_score": 10
            }
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let answers = dir.path().join("answers.toml");
    std::fs::write(
        &answers,
        "[answers]\n101 = \"reviewed\"\n102 = \"by\"\n",
    )
    .unwrap();

    examkit()
        .arg("--base-url")
        .arg(server.uri())
        .arg("take")
        .arg("1")
        .arg("--answers")
        .arg(&answers)
        .assert()
        .success()
        .stdout(predicate::str::contains("2/2 answered"))
        .stdout(predicate::str::contains("Attempt 77 submitted"))
        .stdout(predicate::str::contains("Total score 10"));
}

#[tokio::test(flavor = "multi_thread")]
async fn interactive_failed_submit_stays_in_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exams"))
        .and(query_param("id", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/exams/submit"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "success": false,
            "message": "database unavailable"
        })))
        .mount(&server)
        .await;

    // A failed submit must leave the user in the session (no phantom
    // "time is up" submission from the timer channel shutting down).
    examkit()
        .arg("--base-url")
        .arg(server.uri())
        .arg("take")
        .arg("1")
        .write_stdin("status\nanswer 101 reviewed\nsubmit\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("| started "))
        .stdout(predicate::str::contains("Q101 = reviewed"))
        .stdout(predicate::str::contains("Submission failed"))
        .stdout(predicate::str::contains("Attempt abandoned"))
        .stdout(predicate::str::contains("Time is up").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn review_filters_incorrect_results() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exams/result"))
        .and(query_param("attempt_id", "77"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "attempt": {
                    "attempt_id": 77,
                    "score_listening": 0,
                    "score_reading": 5,
                    "total_score": 5
                },
                "questions": [
                    {
                        "question_id": 11,
                        "part_number": 5,
                        "question_number": 101,
                        "options": ["reviewed", "review"],
                        "user_selected": "reviewed",
                        "correct_answer": "reviewed",
                        "is_correct": true
                    },
                    {
                        "question_id": 12,
                        "part_number": 5,
                        "question_number": 102,
                        "options": ["at", "by"],
                        "user_selected": "at",
                        "correct_answer": "by",
                        "is_correct": false,
                        "explanation": "The deadline sense requires 'by'."
                    }
                ],
                "groups": []
            }
        })))
        .mount(&server)
        .await;

    examkit()
        .arg("--base-url")
        .arg(server.uri())
        .arg("review")
        .arg("77")
        .arg("--filter")
        .arg("incorrect")
        .arg("--explanations")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 correct, 1 incorrect"))
        .stdout(predicate::str::contains("Q102"))
        .stdout(predicate::str::contains("requires 'by'"))
        .stdout(predicate::str::contains("Q101").not());
}
