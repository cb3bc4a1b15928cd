//! Error types shared across the examkit crates.
//!
//! `ApiError` is defined here so the session engine can classify transport
//! failures (terminal load failure vs. retryable submission failure)
//! without string matching on client errors.

use thiserror::Error;

/// Errors surfaced by the exam API boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The requested resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success HTTP status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The server answered 2xx but set `success: false` in the envelope.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A transport-level failure (DNS, connection refused, ...).
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("invalid response body: {0}")]
    InvalidBody(String),
}

/// Errors from session-local operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Part navigation targeted a part the exam does not contain.
    #[error("part {0} does not exist in this exam")]
    UnknownPart(u32),
}
