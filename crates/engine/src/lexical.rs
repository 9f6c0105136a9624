//! Lexical index and tf-idf scoring.
//!
//! Maps terms to the chunks containing them, with per-term/per-chunk
//! frequency counts. Chunks sharing zero terms with a query score zero and
//! are excluded from results.

use std::collections::HashMap;

use crate::types::Chunk;

/// Tiny tokenizer: lowercase, alphanumeric + apostrophe runs.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c.is_alphanumeric() || c == '\'' {
            for lower in c.to_lowercase() {
                current.push(lower);
            }
        } else if !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }

    tokens
}

/// Term → postings index over a chunk collection.
///
/// Built once per indexing pass; read-only during query serving.
#[derive(Debug, Default)]
pub struct LexicalIndex {
    /// term → (chunk index, term frequency)
    postings: HashMap<String, Vec<(usize, u32)>>,

    /// Token count per chunk, for length normalization
    chunk_token_counts: Vec<u32>,

    chunk_count: usize,
}

impl LexicalIndex {
    /// Build the index over a chunk collection.
    pub fn build(chunks: &[Chunk]) -> Self {
        let mut postings: HashMap<String, Vec<(usize, u32)>> = HashMap::new();
        let mut chunk_token_counts = Vec::with_capacity(chunks.len());

        for (idx, chunk) in chunks.iter().enumerate() {
            let tokens = tokenize(&chunk.text);
            chunk_token_counts.push(tokens.len() as u32);

            let mut frequencies: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *frequencies.entry(token).or_insert(0) += 1;
            }

            for (term, tf) in frequencies {
                postings.entry(term).or_default().push((idx, tf));
            }
        }

        tracing::debug!(
            "Lexical index built: {} terms over {} chunks",
            postings.len(),
            chunks.len()
        );

        Self {
            postings,
            chunk_token_counts,
            chunk_count: chunks.len(),
        }
    }

    /// Number of distinct terms in the index.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    /// Score every chunk sharing at least one term with the query.
    ///
    /// Returns (chunk index, raw tf-idf score) for those chunks only.
    /// Scores are length-normalized so short chunks are not drowned out
    /// by long ones.
    pub fn score(&self, query: &str) -> HashMap<usize, f32> {
        let mut scores: HashMap<usize, f32> = HashMap::new();
        if self.chunk_count == 0 {
            return scores;
        }

        let mut query_terms = tokenize(query);
        query_terms.sort();
        query_terms.dedup();

        for term in &query_terms {
            let Some(entries) = self.postings.get(term) else {
                continue;
            };

            let df = entries.len() as f32;
            let idf = (1.0 + self.chunk_count as f32 / df).ln();

            for &(idx, tf) in entries {
                let length = (self.chunk_token_counts[idx].max(1) as f32).sqrt();
                *scores.entry(idx).or_insert(0.0) += tf as f32 * idf / length;
            }
        }

        scores
    }
}
