//! Retrieval-and-citation engine for corpusqa.
//!
//! The pipeline: load and chunk a plain-text corpus, index it lexically
//! (and semantically when an embedding provider is available), retrieve
//! with score fusion, synthesize an answer extractively or generatively,
//! and bind every answer to citations of the chunks it drew on.
//!
//! Provider failures degrade rather than fail: an unanswerable query gets
//! a placeholder answer with the condition recorded, and a lost provider
//! shows up as a degradation in the answer metadata.

pub mod chunker;
pub mod citations;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod engine;
pub mod lexical;
pub mod retrieve;
pub mod snapshot;
pub mod synthesize;
pub mod types;
pub mod vector;

#[cfg(test)]
mod tests;

// Re-export the engine surface
pub use config::EngineConfig;
pub use embeddings::{create_provider, EmbeddingProvider, MockEmbedder};
pub use engine::QueryEngine;
pub use synthesize::NO_ANSWER_TEXT;
pub use types::{
    Answer, AnswerCondition, AnswerMeta, Chunk, Citation, Degradation, HealthReport,
    IndexHandle, QueryMode, RetrievalHit, RetrievalResult, SourceRef,
};
