//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use examkit_core::traits::ExamApi;

pub mod list;
pub mod review;
pub mod show;
pub mod take;

/// Resolve configuration and build the API client shared by all commands.
pub fn build_api(base_url: Option<String>, config_path: Option<&Path>) -> Result<Arc<dyn ExamApi>> {
    let mut config = examkit_client::load_config_from(config_path)?;
    if let Some(url) = base_url {
        config.base_url = url;
    }
    tracing::debug!(base_url = %config.base_url, "exam API configured");
    Ok(Arc::new(config.into_api()))
}
