//! Error types for corpusqa.
//!
//! This module defines a unified error enum that covers the hard failure
//! categories of the application: configuration, I/O, provider access,
//! engine internals, and malformed input.
//!
//! Expected degradations (provider unavailable at query time, empty corpus,
//! nothing above the relevance floor) are NOT errors — they are surfaced as
//! metadata on the answer so `query()` always returns a well-formed result.

use thiserror::Error;

/// Unified error type for corpusqa.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// External provider errors (embedding or completion APIs)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Retrieval engine errors (index build, corrupt snapshot)
    #[error("Engine error: {0}")]
    Engine(String),

    /// Malformed caller input (e.g., empty question string)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
