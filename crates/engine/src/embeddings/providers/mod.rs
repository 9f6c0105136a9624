//! Embedding provider implementations.

mod mock;
mod ollama;
mod openai;

pub use mock::MockEmbedder;
pub use ollama::OllamaEmbedder;
pub use openai::OpenAiEmbedder;

use std::time::Duration;

/// Timeout applied to every embedding HTTP call.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether an HTTP status is worth one retry. Rate limiting and server
/// errors may clear; client errors are deterministic.
pub(crate) fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
