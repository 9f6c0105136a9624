//! Vector index and cosine similarity search.
//!
//! The index holds indices into the snapshot's chunk collection for chunks
//! that carry an embedding. Chunks whose embedding call failed at index
//! time are simply absent and served by the lexical signal alone.

use crate::types::Chunk;

/// Brute-force cosine index over embedded chunks.
#[derive(Debug, Default)]
pub struct VectorIndex {
    /// Indices of chunks (in snapshot order) that carry an embedding
    members: Vec<usize>,

    dimensions: usize,
}

impl VectorIndex {
    /// Build the index over the chunks that have embeddings.
    ///
    /// Returns `None` when no chunk carries an embedding, so callers can
    /// distinguish "vector index present" from "nothing to search".
    pub fn build(chunks: &[Chunk]) -> Option<Self> {
        let members: Vec<usize> = chunks
            .iter()
            .enumerate()
            .filter(|(_, c)| c.embedding.is_some())
            .map(|(i, _)| i)
            .collect();

        if members.is_empty() {
            return None;
        }

        let dimensions = chunks[members[0]]
            .embedding
            .as_ref()
            .map(|e| e.len())
            .unwrap_or(0);

        tracing::debug!(
            "Vector index built: {} of {} chunks embedded ({} dims)",
            members.len(),
            chunks.len(),
            dimensions
        );

        Some(Self { members, dimensions })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Cosine similarity of the query vector against every embedded chunk.
    ///
    /// Returns (chunk index, similarity) pairs. Mismatched dimensions score
    /// zero rather than failing the query.
    pub fn search(&self, query: &[f32], chunks: &[Chunk]) -> Vec<(usize, f32)> {
        self.members
            .iter()
            .filter_map(|&idx| {
                let embedding = chunks[idx].embedding.as_ref()?;
                Some((idx, cosine_similarity(query, embedding)))
            })
            .collect()
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
