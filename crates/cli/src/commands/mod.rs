//! Command handlers for the corpusqa CLI.

pub mod ask;
pub mod health;
pub mod index;

pub use ask::AskCommand;
pub use health::HealthCommand;
pub use index::IndexCommand;

use corpusqa_core::{config::AppConfig, AppError, AppResult};
use corpusqa_engine::{create_provider, EngineConfig, QueryEngine};
use corpusqa_llm::create_client;

/// Build a query engine from the application configuration.
///
/// Providers are attached only when augmentation prerequisites are
/// satisfied; otherwise the engine runs basic-only and augmented queries
/// degrade gracefully.
pub(crate) fn build_engine(config: &AppConfig) -> AppResult<QueryEngine> {
    let mut engine_config = EngineConfig::default();
    if let Some(top_k) = config.top_k {
        engine_config.top_k = top_k;
    }
    if let Some(size) = config.chunk_target_size {
        engine_config.chunk_target_size = size;
        engine_config.chunk_max_size = size * 2;
    }
    if let Some(floor) = config.relevance_floor {
        engine_config.relevance_floor = floor;
    }
    engine_config.completion_model = config.completion_model.clone();
    engine_config.embedding_model = config.embedding_model.clone();

    let mut engine = QueryEngine::new(&config.corpus_dir, engine_config);

    if config.augmentation_available() {
        let embedder = create_provider(
            &config.provider,
            &config.embedding_model,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
        )?;
        let completion = create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
        )
        .map_err(AppError::Config)?;

        engine = engine
            .with_embedder(embedder)
            .with_completion(completion);
    } else {
        tracing::debug!(
            "Augmentation prerequisites not met for provider '{}', running basic-only",
            config.provider
        );
    }

    Ok(engine)
}
