//! HTTP implementation of the exam API.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::instrument;

use examkit_core::error::ApiError;
use examkit_core::model::{Attempt, Exam, ExamDetail, ExamResult};
use examkit_core::traits::{ExamApi, SubmissionPayload};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Exam API client over HTTP.
///
/// Every endpoint wraps its payload in a `{success, data, message}`
/// envelope; this client unwraps it and maps failures onto [`ApiError`].
pub struct HttpExamApi {
    base_url: String,
    timeout_secs: u64,
    client: reqwest::Client,
}

/// The server's uniform response envelope.
#[derive(Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpExamApi {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout_secs,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_transport(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Network(e.to_string())
        }
    }

    /// Unwrap one response: map the status code, then the envelope.
    async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
        what: &str,
    ) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        if status == 404 {
            return Err(ApiError::NotFound(what.to_string()));
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(ApiError::Api { status, message });
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidBody(format!("{what}: {e}")))?;

        if !envelope.success {
            return Err(ApiError::Rejected(
                envelope.message.unwrap_or_else(|| what.to_string()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::InvalidBody(format!("{what}: missing data")))
    }
}

#[async_trait]
impl ExamApi for HttpExamApi {
    #[instrument(skip(self))]
    async fn list_exams(&self) -> Result<Vec<Exam>, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/exams", self.base_url))
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        self.decode(response, "exam catalog").await
    }

    #[instrument(skip(self))]
    async fn exam_detail(&self, exam_id: u64) -> Result<ExamDetail, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/exams", self.base_url))
            .query(&[("id", exam_id)])
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        self.decode(response, &format!("exam {exam_id}")).await
    }

    #[instrument(skip(self, payload), fields(exam_id = payload.exam_id, answered = payload.answers.len()))]
    async fn submit_exam(&self, payload: &SubmissionPayload) -> Result<Attempt, ApiError> {
        let response = self
            .client
            .post(format!("{}/api/exams/submit", self.base_url))
            .json(payload)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        let attempt: Attempt = self.decode(response, "submission").await?;
        tracing::info!(attempt_id = attempt.attempt_id, "submission accepted");
        Ok(attempt)
    }

    #[instrument(skip(self))]
    async fn exam_result(&self, attempt_id: u64) -> Result<ExamResult, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/exams/result", self.base_url))
            .query(&[("attempt_id", attempt_id)])
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;
        self.decode(response, &format!("attempt {attempt_id}")).await
    }
}
