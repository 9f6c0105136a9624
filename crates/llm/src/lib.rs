//! Completion-provider integration for corpusqa.
//!
//! This crate provides a provider-agnostic abstraction for chat/completion
//! models. The generative synthesizer consumes it as an opaque capability:
//! prompt in, text out. Providers are injected so the retrieval core can be
//! tested with deterministic stand-ins.
//!
//! # Providers
//! - **OpenAI**: chat completions API (requires API key)
//! - **Ollama**: local LLM runtime
//!
//! # Example
//! ```no_run
//! use corpusqa_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient};
