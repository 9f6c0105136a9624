//! Embedding providers for the vector index.
//!
//! The engine treats embeddings as an injected capability. Real providers
//! call out over HTTP; the mock provider generates deterministic
//! content-derived vectors for tests and offline development.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};
pub use providers::{MockEmbedder, OllamaEmbedder, OpenAiEmbedder};
