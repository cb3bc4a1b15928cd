//! The exam API boundary trait.
//!
//! `ExamApi` is implemented over HTTP by the `examkit-client` crate; the
//! session engine only ever talks to this trait, which keeps the engine
//! testable without a server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::{AnswerMap, Attempt, Exam, ExamDetail, ExamResult};

/// Backend operations the session and review engines depend on.
///
/// Each method maps to exactly one request; callers own any retry policy.
#[async_trait]
pub trait ExamApi: Send + Sync {
    /// Fetch the exam catalog.
    async fn list_exams(&self) -> Result<Vec<Exam>, ApiError>;

    /// Fetch one exam's full structure.
    async fn exam_detail(&self, exam_id: u64) -> Result<ExamDetail, ApiError>;

    /// Submit a finished attempt, yielding the scored attempt.
    async fn submit_exam(&self, payload: &SubmissionPayload) -> Result<Attempt, ApiError>;

    /// Fetch the graded results of a submitted attempt.
    async fn exam_result(&self, attempt_id: u64) -> Result<ExamResult, ApiError>;
}

/// The body posted to submit an attempt: the exam id and a snapshot of the
/// answer map. Unanswered questions are simply absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionPayload {
    pub exam_id: u64,
    pub answers: AnswerMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_serializes_answers_keyed_by_question_id() {
        let mut answers = AnswerMap::new();
        answers.insert(42, "B".into());
        let payload = SubmissionPayload {
            exam_id: 7,
            answers,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["exam_id"], 7);
        assert_eq!(json["answers"]["42"], "B");
    }

    #[test]
    fn payload_omits_unanswered_questions() {
        let payload = SubmissionPayload {
            exam_id: 1,
            answers: AnswerMap::new(),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json["answers"].as_object().unwrap().is_empty());
    }
}
