//! OpenAI embedding provider.
//!
//! Uses the embeddings API:
//! https://platform.openai.com/docs/api-reference/embeddings

use serde::{Deserialize, Serialize};

use corpusqa_core::{AppError, AppResult};

use crate::embeddings::provider::EmbeddingProvider;
use crate::embeddings::providers::{http_client, is_transient_status};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    index: usize,
    embedding: Vec<f32>,
}

/// OpenAI embedding client.
pub struct OpenAiEmbedder {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(endpoint: Option<&str>, api_key: impl Into<String>, model: &str) -> Self {
        Self {
            base_url: endpoint.unwrap_or("https://api.openai.com").to_string(),
            api_key: api_key.into(),
            model: model.to_string(),
            client: http_client(),
        }
    }

    /// Send the request, retrying once on transient failures.
    async fn send(&self, texts: &[String]) -> AppResult<EmbeddingResponse> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
        };

        for attempt in 0..2 {
            let result = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&body)
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
                        "Failed to send embedding request to OpenAI: {}",
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
                    "OpenAI embeddings error ({}): {}",
                    status, error_text
                )));
            }

            return response.json::<EmbeddingResponse>().await.map_err(|e| {
                AppError::Provider(format!("Failed to parse OpenAI embeddings: {}", e))
            });
        }

        Err(AppError::Provider(
            "OpenAI embedding request failed after retry".to_string(),
        ))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut response = self.send(texts).await?;
        if response.data.len() != texts.len() {
            return Err(AppError::Provider(format!(
                "OpenAI returned {} embeddings for {} inputs",
                response.data.len(),
                texts.len()
            )));
        }

        // The API documents data in input order but carries indices anyway
        response.data.sort_by_key(|d| d.index);
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}
