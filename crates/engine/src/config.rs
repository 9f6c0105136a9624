//! Engine configuration with documented defaults.

use serde::{Deserialize, Serialize};

/// Tunable constants for chunking, retrieval, and synthesis.
///
/// All values have fixed defaults and are overridable by the surrounding
/// bootstrap layer; none are user-configurable per query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Target chunk size in characters. Slightly larger chunks improve
    /// retrieval quality for prose corpora.
    pub chunk_target_size: usize,

    /// Maximum chunk size before a split is forced
    pub chunk_max_size: usize,

    /// Number of chunks to retrieve per query (clamped to 1..=10)
    pub top_k: usize,

    /// Minimum normalized relevance for a chunk to appear in results.
    /// Scores are normalized to [0, 1] per query before the floor applies.
    pub relevance_floor: f32,

    /// Fusion weight for the semantic score when both signals are available
    pub semantic_weight: f32,

    /// Fusion weight for the lexical score when both signals are available
    pub lexical_weight: f32,

    /// Maximum citation snippet length in characters
    pub snippet_max_chars: usize,

    /// Sentence budget for extractive answers
    pub answer_max_sentences: usize,

    /// Character cap for extractive answers
    pub answer_max_chars: usize,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Completion model identifier
    pub completion_model: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chunk_target_size: 800,
            chunk_max_size: 1600,
            top_k: 4,
            relevance_floor: 0.05,
            semantic_weight: 0.6,
            lexical_weight: 0.4,
            snippet_max_chars: 300,
            answer_max_sentences: 3,
            answer_max_chars: 600,
            embedding_model: "text-embedding-3-small".to_string(),
            completion_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl EngineConfig {
    /// Effective top-k, clamped to a sane range.
    pub fn clamped_top_k(&self) -> usize {
        self.top_k.clamp(1, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.chunk_target_size, 800);
        assert_eq!(config.top_k, 4);
        assert!((config.semantic_weight + config.lexical_weight - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_top_k_clamping() {
        let mut config = EngineConfig::default();
        config.top_k = 0;
        assert_eq!(config.clamped_top_k(), 1);
        config.top_k = 50;
        assert_eq!(config.clamped_top_k(), 10);
        config.top_k = 5;
        assert_eq!(config.clamped_top_k(), 5);
    }
}
