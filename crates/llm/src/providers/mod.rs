//! Completion provider implementations.

mod ollama;
mod openai;

pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use std::time::Duration;

/// Default timeout applied to every provider HTTP call.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether an HTTP status indicates a transient failure worth one retry.
///
/// Rate limiting and server-side errors may clear on a second attempt;
/// client errors (bad request, auth failure) are deterministic and must
/// not be retried.
pub(crate) fn is_transient_status(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Build an HTTP client with the provider timeout applied.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}
