//! Ollama embedding provider.
//!
//! Ollama embeddings API: POST /api/embed accepts a batch of inputs and
//! returns one vector per input.

use serde::{Deserialize, Serialize};

use corpusqa_core::{AppError, AppResult};

use crate::embeddings::provider::EmbeddingProvider;
use crate::embeddings::providers::{http_client, is_transient_status};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Ollama embedding client.
pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OllamaEmbedder {
    pub fn new(endpoint: Option<&str>, model: &str) -> Self {
        Self {
            base_url: endpoint.unwrap_or("http://localhost:11434").to_string(),
            model: model.to_string(),
            client: http_client(),
        }
    }

    async fn send(&self, texts: &[String]) -> AppResult<EmbedResponse> {
        let url = format!("{}/api/embed", self.base_url);
        let body = EmbedRequest {
            model: &self.model,
            input: texts,
        };

        for attempt in 0..2 {
            let result = self.client.post(&url).json(&body).send().await;

            let response = match result {
                Ok(response) => response,
                Err(e) if attempt == 0 && e.is_connect() => {
                    tracing::warn!("Ollama connection failed, retrying once: {}", e);
                    continue;
                }
                Err(e) => {
                    return Err(AppError::Provider(format!(
                        "Failed to send embedding request to Ollama: {}",
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
                    "Ollama embeddings error ({}): {}",
                    status, error_text
                )));
            }

            return response.json::<EmbedResponse>().await.map_err(|e| {
                AppError::Provider(format!("Failed to parse Ollama embeddings: {}", e))
            });
        }

        Err(AppError::Provider(
            "Ollama embedding request failed after retry".to_string(),
        ))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self.send(texts).await?;
        if response.embeddings.len() != texts.len() {
            return Err(AppError::Provider(format!(
                "Ollama returned {} embeddings for {} inputs",
                response.embeddings.len(),
                texts.len()
            )));
        }

        Ok(response.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedder_creation() {
        let embedder = OllamaEmbedder::new(None, "nomic-embed-text");
        assert_eq!(embedder.provider_name(), "ollama");
        assert_eq!(embedder.model_name(), "nomic-embed-text");
        assert_eq!(embedder.base_url, "http://localhost:11434");
    }

    #[tokio::test]
    async fn test_empty_batch_short_circuits() {
        let embedder = OllamaEmbedder::new(Some("http://127.0.0.1:1"), "m");
        let result = embedder.embed_batch(&[]).await.unwrap();
        assert!(result.is_empty());
    }
}
