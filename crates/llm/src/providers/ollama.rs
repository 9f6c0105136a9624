//! Ollama completion provider implementation.
//!
//! This module provides integration with Ollama, a local LLM runtime.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use serde::{Deserialize, Serialize};

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::providers::{http_client, is_transient_status};
use corpusqa_core::{AppError, AppResult};

/// Ollama API request format.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    stream: bool,
}

/// Ollama API response format.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    response: String,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

/// Ollama completion client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client with timeout applied
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    ///
    /// Default URL: http://localhost:11434
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:11434")
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: http_client(),
        }
    }

    /// Convert LlmRequest to Ollama format.
    fn to_ollama_request(&self, request: &LlmRequest) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            temperature: request.temperature,
            num_predict: request.max_tokens,
            stream: false,
        }
    }

    /// Convert Ollama response to LlmResponse.
    fn convert_response(&self, response: OllamaResponse) -> LlmResponse {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        LlmResponse {
            content: response.response,
            model: response.model,
            usage,
        }
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Ollama");
        tracing::debug!("Request: {:?}", request);

        let ollama_request = self.to_ollama_request(request);
        let url = format!("{}/api/generate", self.base_url);

        for attempt in 0..2 {
            let result = self.client.post(&url).json(&ollama_request).send().await;

            let response = match result {
                Ok(response) => response,
                Err(e) if attempt == 0 && e.is_connect() => {
                    tracing::warn!("Ollama connection failed, retrying once: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(AppError::Provider(format!(
                        "Failed to send request to Ollama: {}",
                        e
                    )))
                }
            };

            let status = response.status();
            if !status.is_success() {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());

                if attempt == 0 && is_transient_status(status) {
                    tracing::warn!("Ollama returned {}, retrying once", status);
                    continue;
                }

                return Err(AppError::Provider(format!(
                    "Ollama API error ({}): {}",
                    status, error_text
                )));
            }

            // For non-streaming, Ollama returns a single JSON object
            let ollama_response: OllamaResponse = response.json().await.map_err(|e| {
                AppError::Provider(format!("Failed to parse Ollama response: {}", e))
            })?;

            tracing::info!("Received completion from Ollama");

            return Ok(self.convert_response(ollama_response));
        }

        Err(AppError::Provider(
            "Ollama request failed after retry".to_string(),
        ))
    }
}
