//! examkit-client — exam API access.
//!
//! Implements the `ExamApi` trait over HTTP against the exam platform's
//! REST endpoints, plus configuration loading and a scriptable in-memory
//! backend for tests.

pub mod config;
pub mod http;
pub mod mock;

pub use config::{load_config, load_config_from, ClientConfig};
pub use http::HttpExamApi;
pub use mock::MockExamApi;
