//! Completion client factory.
//!
//! This module provides a factory for creating completion clients based on
//! application configuration. It handles provider resolution and secret
//! injection.

use std::sync::Arc;

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};

/// Create a completion client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Errors
/// Returns error if the provider is unknown or required secrets are missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match provider.to_lowercase().as_str() {
        "openai" => {
            let api_key = api_key.ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            let client = match endpoint {
                Some(endpoint) => OpenAiClient::with_base_url(api_key, endpoint),
                None => OpenAiClient::new(api_key),
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url);
            Ok(Arc::new(client))
        }
        _ => Err(format!("Unknown provider: {}", provider)),
    }
}
