//! OpenAI completion provider implementation.
//!
//! Uses the chat completions API:
//! https://platform.openai.com/docs/api-reference/chat

use serde::{Deserialize, Serialize};

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use crate::providers::{http_client, is_transient_status};
use corpusqa_core::{AppError, AppResult};

/// OpenAI chat message.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// OpenAI API request format.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// OpenAI completion client.
pub struct OpenAiClient {
    /// Base URL for the API
    base_url: String,

    /// API key (Bearer token)
    api_key: String,

    /// HTTP client with timeout applied
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Create a new OpenAI client with the default endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com")
    }

    /// Create a new OpenAI client with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client: http_client(),
        }
    }

    /// Convert LlmRequest to OpenAI chat format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Send the request, retrying once on transient failures.
    async fn send(&self, chat_request: &ChatRequest) -> AppResult<ChatResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        for attempt in 0..2 {
            let result = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(chat_request)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) if attempt == 0 && e.is_connect() => {
                    tracing::warn!("OpenAI connection failed, retrying once: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(AppError::Provider(format!(
                        "Failed to send request to OpenAI: {}",
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
                    tracing::warn!("OpenAI returned {}, retrying once", status);
                    continue;
                }

                return Err(AppError::Provider(format!(
                    "OpenAI API error ({}): {}",
                    status, error_text
                )));
            }

            return response.json::<ChatResponse>().await.map_err(|e| {
                AppError::Provider(format!("Failed to parse OpenAI response: {}", e))
            });
        }

        Err(AppError::Provider(
            "OpenAI request failed after retry".to_string(),
        ))
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to OpenAI");

        let chat_request = self.to_chat_request(request);
        let chat_response = self.send(&chat_request).await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Provider("OpenAI returned no choices".to_string()))?;

        let usage = chat_response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        tracing::info!("Received completion from OpenAI");

        Ok(LlmResponse {
            content: content.trim().to_string(),
            model: chat_response.model,
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_client_creation() {
        let client = OpenAiClient::new("sk-test");
        assert_eq!(client.provider_name(), "openai");
        assert_eq!(client.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_chat_request_conversion() {
        let client = OpenAiClient::new("sk-test");
        let request = LlmRequest::new("What is the Astronomicon?", "gpt-4o-mini")
            .with_system("Answer only from context.")
            .with_temperature(0.3)
            .with_max_tokens(500);

        let chat = client.to_chat_request(&request);
        assert_eq!(chat.model, "gpt-4o-mini");
        assert_eq!(chat.messages.len(), 2);
        assert_eq!(chat.messages[0].role, "system");
        assert_eq!(chat.messages[1].role, "user");
        assert_eq!(chat.messages[1].content, "What is the Astronomicon?");
        assert_eq!(chat.temperature, Some(0.3));
        assert_eq!(chat.max_tokens, Some(500));
    }

    #[test]
    fn test_chat_request_without_system() {
        let client = OpenAiClient::new("sk-test");
        let request = LlmRequest::new("hello", "gpt-4o-mini");

        let chat = client.to_chat_request(&request);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].role, "user");
    }
}
