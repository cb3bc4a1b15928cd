//! In-memory exam API for testing without a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use examkit_core::error::ApiError;
use examkit_core::model::{
    Attempt, Exam, ExamDetail, ExamResult, QuestionResult,
};
use examkit_core::traits::{ExamApi, SubmissionPayload};

/// A scriptable exam backend.
///
/// Seeded with exam structures and per-question answer keys; submissions
/// are graded in memory and can be fetched back as results, so a full
/// take-then-review flow runs without any network.
pub struct MockExamApi {
    exams: Vec<ExamDetail>,
    /// question_id → correct answer.
    answer_keys: HashMap<u64, String>,
    attempts: Mutex<HashMap<u64, ExamResult>>,
    next_attempt_id: AtomicU64,
    submit_calls: AtomicU32,
    fail_submits: AtomicU32,
    last_payload: Mutex<Option<SubmissionPayload>>,
}

impl MockExamApi {
    pub fn new(exams: Vec<ExamDetail>, answer_keys: HashMap<u64, String>) -> Self {
        Self {
            exams,
            answer_keys,
            attempts: Mutex::new(HashMap::new()),
            next_attempt_id: AtomicU64::new(1),
            submit_calls: AtomicU32::new(0),
            fail_submits: AtomicU32::new(0),
            last_payload: Mutex::new(None),
        }
    }

    /// Make the next `n` submission calls fail with a network error.
    pub fn fail_next_submits(&self, n: u32) {
        self.fail_submits.store(n, Ordering::SeqCst);
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// The payload of the most recent submission call.
    pub fn last_payload(&self) -> Option<SubmissionPayload> {
        self.last_payload.lock().unwrap().clone()
    }

    fn grade(&self, payload: &SubmissionPayload, detail: &ExamDetail) -> ExamResult {
        let questions: Vec<QuestionResult> = detail
            .questions()
            .map(|q| {
                let user_selected = payload.answers.get(&q.question_id).cloned();
                let correct_answer = self.answer_keys.get(&q.question_id).cloned();
                let is_correct = match (&user_selected, &correct_answer) {
                    (Some(given), Some(key)) => given == key,
                    _ => false,
                };
                QuestionResult {
                    question: q.clone(),
                    user_selected,
                    correct_answer,
                    is_correct,
                    explanation: None,
                }
            })
            .collect();

        let correct = questions.iter().filter(|r| r.is_correct).count() as i32;
        let attempt_id = self.next_attempt_id.fetch_add(1, Ordering::SeqCst);
        ExamResult {
            attempt: Attempt {
                attempt_id,
                score_listening: correct * 5,
                score_reading: correct * 5,
                total_score: correct * 10,
            },
            questions,
            groups: detail.groups.clone(),
        }
    }
}

#[async_trait]
impl ExamApi for MockExamApi {
    async fn list_exams(&self) -> Result<Vec<Exam>, ApiError> {
        Ok(self.exams.iter().map(|d| d.exam.clone()).collect())
    }

    async fn exam_detail(&self, exam_id: u64) -> Result<ExamDetail, ApiError> {
        self.exams
            .iter()
            .find(|d| d.exam.exam_id == exam_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("exam {exam_id}")))
    }

    async fn submit_exam(&self, payload: &SubmissionPayload) -> Result<Attempt, ApiError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_payload.lock().unwrap() = Some(payload.clone());

        let remaining = self.fail_submits.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_submits.store(remaining - 1, Ordering::SeqCst);
            return Err(ApiError::Network("connection reset by peer".into()));
        }

        let detail = self.exam_detail(payload.exam_id).await?;
        let result = self.grade(payload, &detail);
        let attempt = result.attempt.clone();
        self.attempts
            .lock()
            .unwrap()
            .insert(attempt.attempt_id, result);
        Ok(attempt)
    }

    async fn exam_result(&self, attempt_id: u64) -> Result<ExamResult, ApiError> {
        self.attempts
            .lock()
            .unwrap()
            .get(&attempt_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("attempt {attempt_id}")))
    }
}
