//! Deterministic mock embedding provider.
//!
//! Hashes word and character-trigram features into a fixed-dimension
//! vector. Not semantically meaningful like a real model, but consistent
//! and content-dependent, which is what tests and offline development need.

use corpusqa_core::AppResult;

use crate::embeddings::provider::EmbeddingProvider;

/// Mock provider generating content-derived vectors.
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lower = text.to_lowercase();

        for word in lower.split_whitespace().filter(|w| w.len() > 2) {
            // Whole-word feature
            let word_hash = word
                .bytes()
                .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
            vector[(word_hash as usize) % self.dimensions] += 1.0;

            // Character trigram features give related words overlapping mass
            let chars: Vec<char> = word.chars().collect();
            for window in chars.windows(3) {
                let trigram_hash = window
                    .iter()
                    .fold(0u64, |acc, &c| {
                        acc.wrapping_mul(37).wrapping_add(c as u64)
                    });
                vector[(trigram_hash as usize) % self.dimensions] += 0.5;
            }
        }

        // Unit-normalize so cosine comparisons behave
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "trigram-v1"
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
