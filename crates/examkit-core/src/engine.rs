//! Session orchestration: loading exams, driving submission through the
//! API boundary, and the countdown task that auto-submits on expiry.

use std::sync::Arc;

use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};

use crate::error::ApiError;
use crate::model::Attempt;
use crate::review::Review;
use crate::session::{ExamSession, TimerEvent};
use crate::traits::ExamApi;

/// Drives exam sessions against an [`ExamApi`] backend.
///
/// The engine owns no session state; sessions are handed to the caller and
/// passed back in for submission, so one engine can serve many attempts.
pub struct SessionEngine {
    api: Arc<dyn ExamApi>,
}

impl SessionEngine {
    pub fn new(api: Arc<dyn ExamApi>) -> Self {
        Self { api }
    }

    /// Fetch an exam's structure and start an attempt on it.
    ///
    /// One fetch per session: the structure is owned by the session from
    /// here on and is never re-fetched mid-attempt.
    pub async fn load_session(&self, exam_id: u64) -> Result<ExamSession, ApiError> {
        let detail = self.api.exam_detail(exam_id).await?;
        Ok(ExamSession::start(detail))
    }

    /// Submit the session's answers.
    ///
    /// Returns `Ok(None)` when the session has already claimed or finished
    /// submission: a lost race with another trigger, not an error. On API
    /// failure the session is rolled back to a retryable state and the
    /// error is propagated.
    pub async fn submit(&self, session: &mut ExamSession) -> Result<Option<Attempt>, ApiError> {
        let Some(payload) = session.begin_submission() else {
            return Ok(None);
        };
        match self.api.submit_exam(&payload).await {
            Ok(attempt) => {
                session.complete_submission(&attempt);
                Ok(Some(attempt))
            }
            Err(err) => {
                session.fail_submission();
                Err(err)
            }
        }
    }

    /// Fetch the graded results of a submitted attempt.
    pub async fn load_review(&self, attempt_id: u64) -> Result<Review, ApiError> {
        let result = self.api.exam_result(attempt_id).await?;
        Ok(Review::new(result))
    }
}

/// Handle to a running countdown task.
///
/// The task ticks the shared session once per second and signals expiry
/// through the paired receiver. It stops on its own once the session's
/// countdown goes idle (expiry fired, or the attempt was accepted); an
/// in-flight or failed submission keeps it running. Dropping the handle
/// aborts the task.
pub struct AutoSubmit {
    handle: JoinHandle<()>,
}

impl AutoSubmit {
    /// Spawn the countdown task for a shared session.
    ///
    /// The returned receiver resolves `Ok(())` exactly once, when the
    /// countdown expires. If the attempt is accepted first, the task exits
    /// and the receiver resolves to a cancellation error instead; callers
    /// racing on it must match `Ok` to tell expiry from shutdown.
    pub fn spawn(session: Arc<Mutex<ExamSession>>) -> (Self, oneshot::Receiver<()>) {
        let (expired_tx, expired_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            // The first tick of a tokio interval completes immediately;
            // consume it so the session loses its first second one full
            // second after spawn.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let event = session.lock().await.tick();
                match event {
                    TimerEvent::Tick(_) => {}
                    TimerEvent::Expired => {
                        tracing::info!("countdown expired; signalling auto-submit");
                        let _ = expired_tx.send(());
                        break;
                    }
                    TimerEvent::Idle => break,
                }
            }
        });
        (Self { handle }, expired_rx)
    }

    /// Stop the countdown immediately.
    pub fn cancel(&self) {
        self.handle.abort();
    }
}

impl Drop for AutoSubmit {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
