//! Embedding provider trait and factory.

use std::sync::Arc;

use corpusqa_core::{AppError, AppResult};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the provider name (e.g., "openai", "ollama", "mock").
    fn provider_name(&self) -> &str;

    /// Get the model identifier.
    fn model_name(&self) -> &str;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Provider("No embedding returned".to_string()))
    }
}

/// Create an embedding provider from bootstrap settings.
pub fn create_provider(
    provider: &str,
    model: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider {
        "openai" => {
            let key = api_key.ok_or_else(|| {
                AppError::Config("OpenAI embedding provider requires an API key".to_string())
            })?;
            Ok(Arc::new(super::providers::OpenAiEmbedder::new(
                endpoint, key, model,
            )))
        }

        "ollama" => Ok(Arc::new(super::providers::OllamaEmbedder::new(
            endpoint, model,
        ))),

        "mock" => Ok(Arc::new(super::providers::MockEmbedder::new(384))),

        other => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: openai, ollama, mock",
            other
        ))),
    }
}
