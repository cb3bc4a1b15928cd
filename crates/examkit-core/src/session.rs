//! Live exam session state machine.
//!
//! An `ExamSession` owns the single source of truth for an in-progress
//! attempt: the answer map, part navigation, the countdown, and the
//! submission status. Loading happens before a session exists: the engine
//! either constructs an `Active` session from a fetched structure or fails
//! without one, so every constructed session starts out answerable.
//!
//! Status transitions:
//! - `Active -> Submitting` via `begin_submission` (manual or timer-driven;
//!   exclusive, duplicate triggers get `None`)
//! - `Submitting -> Submitted` via `complete_submission`
//! - `Submitting -> SubmissionFailed` via `fail_submission` (retryable:
//!   answering and resubmitting remain possible, answers intact)

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};

use crate::error::SessionError;
use crate::model::{AnswerMap, Attempt, ExamDetail, Question, QuestionId};
use crate::organizer::{organize_detail, PartEntry};
use crate::progress::Progress;
use crate::traits::SubmissionPayload;

/// Remaining-time threshold below which the session is flagged
/// time-critical. Display-only; no behavioral effect.
pub const TIME_CRITICAL_SECS: u64 = 300;

/// Where the attempt stands in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Taking the exam: answers and navigation accepted.
    Active,
    /// A submission call is outstanding; the answer map is frozen.
    Submitting,
    /// The attempt was accepted and scored.
    Submitted { attempt_id: u64 },
    /// The submission call failed; answers are intact and retry is allowed.
    SubmissionFailed,
}

impl SessionStatus {
    /// `true` once the attempt has been accepted; no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Submitted { .. })
    }
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; remaining seconds attached.
    Tick(u64),
    /// The countdown reached zero. Fired exactly once per session.
    Expired,
    /// The countdown is not running (attempt accepted, or expiry already
    /// fired).
    Idle,
}

/// A live, timed, partially-answered attempt at one exam.
#[derive(Debug)]
pub struct ExamSession {
    detail: ExamDetail,
    parts: BTreeMap<u32, Vec<PartEntry>>,
    known_questions: HashSet<QuestionId>,
    total_questions: usize,
    answers: AnswerMap,
    status: SessionStatus,
    current_part: u32,
    remaining_secs: u64,
    expiry_fired: bool,
    started_at: DateTime<Utc>,
}

impl ExamSession {
    /// Begin an attempt on a loaded exam structure.
    ///
    /// The countdown starts at `duration_minutes * 60` and the current part
    /// is the lowest part number present in the structure.
    pub fn start(detail: ExamDetail) -> Self {
        let parts = organize_detail(&detail);
        let known_questions = detail.question_ids();
        let total_questions = detail.question_count();
        let current_part = parts.keys().next().copied().unwrap_or(1);
        let remaining_secs = u64::from(detail.exam.duration_minutes) * 60;

        tracing::info!(
            exam_id = detail.exam.exam_id,
            title = %detail.exam.title,
            questions = total_questions,
            duration_secs = remaining_secs,
            "exam session started"
        );

        Self {
            detail,
            parts,
            known_questions,
            total_questions,
            answers: AnswerMap::new(),
            status: SessionStatus::Active,
            current_part,
            remaining_secs,
            expiry_fired: false,
            started_at: Utc::now(),
        }
    }

    pub fn detail(&self) -> &ExamDetail {
        &self.detail
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn current_part(&self) -> u32 {
        self.current_part
    }

    /// Per-part entries in display order.
    pub fn parts(&self) -> &BTreeMap<u32, Vec<PartEntry>> {
        &self.parts
    }

    /// Read-only view of the answer map.
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn answer_for(&self, question_id: QuestionId) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Display-only flag: under five minutes left.
    pub fn is_time_critical(&self) -> bool {
        self.remaining_secs < TIME_CRITICAL_SECS
    }

    /// Every question in the exam, in part display order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.parts
            .values()
            .flatten()
            .flat_map(|entry| entry.questions())
    }

    /// Look a question up by its user-facing question number.
    pub fn question_by_number(&self, number: u32) -> Option<&Question> {
        self.questions().find(|q| q.question_number == number)
    }

    /// Record or overwrite an answer. Last write wins.
    ///
    /// Returns `false` without mutating when the question id is not part of
    /// this exam, or when submission has already begun: a late answer is a
    /// no-op, not an error.
    pub fn record_answer(&mut self, question_id: QuestionId, value: impl Into<String>) -> bool {
        match self.status {
            SessionStatus::Active | SessionStatus::SubmissionFailed => {}
            _ => {
                tracing::debug!(question_id, "answer ignored: submission already started");
                return false;
            }
        }
        if !self.known_questions.contains(&question_id) {
            tracing::debug!(question_id, "answer ignored: unknown question");
            return false;
        }
        self.answers.insert(question_id, value.into());
        true
    }

    /// Navigate to a part. Pure UI state; valid only for parts the exam has.
    pub fn select_part(&mut self, part: u32) -> Result<(), SessionError> {
        if !self.parts.contains_key(&part) {
            return Err(SessionError::UnknownPart(part));
        }
        self.current_part = part;
        Ok(())
    }

    /// Derive answered/total progress from the answer map.
    pub fn progress(&self) -> Progress {
        Progress::compute(&self.answers, self.total_questions)
    }

    /// Advance the countdown by one second.
    ///
    /// The clock keeps running through `Submitting` and `SubmissionFailed`:
    /// a failed submission never grants extra time, and auto-submit stays
    /// armed. Returns `Expired` exactly once, when the counter reaches
    /// zero; after that, or once the attempt has been accepted, returns
    /// `Idle` so a driving timer knows to stop.
    pub fn tick(&mut self) -> TimerEvent {
        if self.status.is_terminal() || self.expiry_fired {
            return TimerEvent::Idle;
        }
        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
        }
        if self.remaining_secs == 0 {
            self.expiry_fired = true;
            tracing::info!(exam_id = self.detail.exam.exam_id, "time expired");
            return TimerEvent::Expired;
        }
        if self.remaining_secs == TIME_CRITICAL_SECS - 1 {
            tracing::info!(remaining_secs = self.remaining_secs, "time critical");
        }
        TimerEvent::Tick(self.remaining_secs)
    }

    /// Claim the right to submit, freezing the answer map.
    ///
    /// This is the single atomic guard arbitrating between a manual submit
    /// and the countdown reaching zero: the first trigger gets the payload,
    /// every later trigger gets `None` and must do nothing.
    pub fn begin_submission(&mut self) -> Option<SubmissionPayload> {
        match self.status {
            SessionStatus::Active | SessionStatus::SubmissionFailed => {
                self.status = SessionStatus::Submitting;
                tracing::info!(
                    exam_id = self.detail.exam.exam_id,
                    answered = self.answers.len(),
                    total = self.total_questions,
                    "submission started"
                );
                Some(SubmissionPayload {
                    exam_id: self.detail.exam.exam_id,
                    answers: self.answers.clone(),
                })
            }
            _ => {
                tracing::debug!("submit trigger ignored: already submitting or submitted");
                None
            }
        }
    }

    /// Record a successful submission. Ignored unless `Submitting`.
    pub fn complete_submission(&mut self, attempt: &Attempt) {
        if self.status != SessionStatus::Submitting {
            tracing::debug!(
                attempt_id = attempt.attempt_id,
                "completion ignored: session was not submitting"
            );
            return;
        }
        tracing::info!(attempt_id = attempt.attempt_id, "attempt submitted");
        self.status = SessionStatus::Submitted {
            attempt_id: attempt.attempt_id,
        };
    }

    /// Record a failed submission; the session becomes retryable with the
    /// answer map intact. Ignored unless `Submitting`.
    pub fn fail_submission(&mut self) {
        if self.status != SessionStatus::Submitting {
            tracing::debug!("failure ignored: session was not submitting");
            return;
        }
        tracing::warn!(
            exam_id = self.detail.exam.exam_id,
            "submission failed; answers retained for retry"
        );
        self.status = SessionStatus::SubmissionFailed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Exam, QuestionGroup};

    fn question(id: u64, part: u32, number: u32) -> Question {
        Question {
            question_id: id,
            part_number: part,
            question_number: number,
            question_text: None,
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            question_type: None,
            image_urls: vec![],
            audio_urls: vec![],
        }
    }

    /// Two parts, three questions each, one minute on the clock.
    fn two_part_detail() -> ExamDetail {
        ExamDetail {
            exam: Exam {
                exam_id: 7,
                title: "Mini TOEIC".into(),
                description: String::new(),
                duration_minutes: 1,
                total_questions: 6,
                exam_type: None,
            },
            groups: vec![QuestionGroup {
                group_id: 1,
                part_number: 2,
                content_text: Some("Passage".into()),
                image_url: None,
                audio_url: None,
                transcript: None,
                questions: vec![question(4, 2, 4), question(5, 2, 5), question(6, 2, 6)],
            }],
            standalone_questions: vec![
                question(1, 1, 1),
                question(2, 1, 2),
                question(3, 1, 3),
            ],
            audio_url: None,
        }
    }

    #[test]
    fn starts_active_on_lowest_part_with_full_countdown() {
        let session = ExamSession::start(two_part_detail());
        assert_eq!(*session.status(), SessionStatus::Active);
        assert_eq!(session.current_part(), 1);
        assert_eq!(session.remaining_secs(), 60);
        assert_eq!(session.progress().total, 6);
    }

    #[test]
    fn record_answer_is_last_write_wins() {
        let mut session = ExamSession::start(two_part_detail());
        assert!(session.record_answer(1, "A"));
        assert!(session.record_answer(1, "C"));
        assert!(session.record_answer(2, "B"));
        assert_eq!(session.answers().len(), 2);
        assert_eq!(session.answer_for(1), Some("C"));
    }

    #[test]
    fn rejects_answers_for_unknown_questions() {
        let mut session = ExamSession::start(two_part_detail());
        assert!(!session.record_answer(999, "A"));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn select_part_validates_existence() {
        let mut session = ExamSession::start(two_part_detail());
        session.select_part(2).unwrap();
        assert_eq!(session.current_part(), 2);
        assert_eq!(
            session.select_part(5),
            Err(SessionError::UnknownPart(5))
        );
        assert_eq!(session.current_part(), 2);
    }

    #[test]
    fn question_lookup_by_number() {
        let session = ExamSession::start(two_part_detail());
        assert_eq!(session.question_by_number(5).unwrap().question_id, 5);
        assert!(session.question_by_number(99).is_none());
    }

    #[test]
    fn countdown_expires_exactly_once() {
        let mut session = ExamSession::start(two_part_detail());
        for expected in (1..60).rev() {
            assert_eq!(session.tick(), TimerEvent::Tick(expected));
        }
        assert_eq!(session.tick(), TimerEvent::Expired);
        assert_eq!(session.tick(), TimerEvent::Idle);
        assert_eq!(session.remaining_secs(), 0);
    }

    #[test]
    fn countdown_runs_until_attempt_accepted() {
        let mut session = ExamSession::start(two_part_detail());
        assert_eq!(session.tick(), TimerEvent::Tick(59));

        // The clock does not pause for an in-flight submission.
        session.begin_submission().unwrap();
        assert_eq!(session.tick(), TimerEvent::Tick(58));

        session.complete_submission(&Attempt {
            attempt_id: 1,
            score_listening: 0,
            score_reading: 0,
            total_score: 0,
        });
        assert_eq!(session.tick(), TimerEvent::Idle);
        assert_eq!(session.remaining_secs(), 58);
    }

    #[test]
    fn countdown_survives_failed_submission() {
        let mut session = ExamSession::start(two_part_detail());
        session.record_answer(1, "A");
        session.begin_submission().unwrap();
        session.fail_submission();

        // A failed submission must not disarm the timer or grant extra time.
        match session.tick() {
            TimerEvent::Tick(remaining) => assert_eq!(remaining, 59),
            other => panic!("expected a running countdown, got {other:?}"),
        }

        let mut expired = 0;
        for _ in 0..120 {
            if session.tick() == TimerEvent::Expired {
                expired += 1;
            }
        }
        assert_eq!(expired, 1);
        assert_eq!(session.remaining_secs(), 0);
    }

    #[test]
    fn time_critical_flag_tracks_threshold() {
        let mut detail = two_part_detail();
        detail.exam.duration_minutes = 6; // 360s
        let mut session = ExamSession::start(detail);
        assert!(!session.is_time_critical());
        for _ in 0..60 {
            session.tick();
        }
        assert_eq!(session.remaining_secs(), 300);
        assert!(!session.is_time_critical());
        session.tick();
        assert!(session.is_time_critical());
    }

    #[test]
    fn begin_submission_is_exclusive() {
        let mut session = ExamSession::start(two_part_detail());
        session.record_answer(1, "A");

        let payload = session.begin_submission().expect("first trigger wins");
        assert_eq!(payload.exam_id, 7);
        assert_eq!(payload.answers.len(), 1);

        // The losing trigger (timer or second click) is a no-op.
        assert!(session.begin_submission().is_none());
        assert_eq!(*session.status(), SessionStatus::Submitting);
    }

    #[test]
    fn answers_frozen_after_submission_begins() {
        let mut session = ExamSession::start(two_part_detail());
        session.record_answer(1, "A");
        session.begin_submission().unwrap();

        assert!(!session.record_answer(2, "B"));
        assert!(!session.record_answer(1, "D"));
        assert_eq!(session.answer_for(1), Some("A"));
        assert_eq!(session.answers().len(), 1);
    }

    #[test]
    fn failed_submission_is_retryable_with_answers_intact() {
        let mut session = ExamSession::start(two_part_detail());
        session.record_answer(1, "A");
        session.record_answer(2, "B");
        session.record_answer(4, "C");

        session.begin_submission().unwrap();
        session.fail_submission();
        assert_eq!(*session.status(), SessionStatus::SubmissionFailed);
        assert_eq!(session.answers().len(), 3);

        // Still answerable, then retryable through the same path.
        assert!(session.record_answer(3, "D"));
        let retry = session.begin_submission().expect("retry allowed");
        assert_eq!(retry.answers.len(), 4);
    }

    #[test]
    fn completed_submission_is_terminal() {
        let mut session = ExamSession::start(two_part_detail());
        session.begin_submission().unwrap();
        session.complete_submission(&Attempt {
            attempt_id: 501,
            score_listening: 300,
            score_reading: 350,
            total_score: 650,
        });

        assert_eq!(
            *session.status(),
            SessionStatus::Submitted { attempt_id: 501 }
        );
        assert!(session.status().is_terminal());
        assert!(session.begin_submission().is_none());
        assert!(!session.record_answer(1, "A"));
    }

    #[test]
    fn expiry_payload_contains_only_recorded_answers() {
        let mut session = ExamSession::start(two_part_detail());
        session.record_answer(1, "A");
        session.record_answer(2, "B");
        session.record_answer(4, "C");
        assert_eq!(session.progress().percent, 50);

        // Run the clock out.
        let mut expired = 0;
        for _ in 0..120 {
            if session.tick() == TimerEvent::Expired {
                expired += 1;
            }
        }
        assert_eq!(expired, 1);

        let payload = session.begin_submission().unwrap();
        assert_eq!(payload.answers.len(), 3);
        for absent in [3u64, 5, 6] {
            assert!(!payload.answers.contains_key(&absent));
        }
    }
}
