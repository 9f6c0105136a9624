//! Immutable index snapshots.
//!
//! A snapshot bundles the chunk collection with the indexes built over it.
//! Queries read whichever snapshot was current when they started; rebuilds
//! produce a fresh snapshot and swap it in atomically.

use chrono::{DateTime, Utc};

use crate::lexical::LexicalIndex;
use crate::types::Chunk;
use crate::vector::VectorIndex;

/// One consistent view of the indexed corpus.
#[derive(Debug)]
pub struct IndexSnapshot {
    /// All chunks in corpus order (file order, then position within file)
    pub chunks: Vec<Chunk>,

    pub lexical: LexicalIndex,

    /// Present only when at least one chunk was embedded
    pub vector: Option<VectorIndex>,

    /// Monotonic build generation; starts at 0 for the empty snapshot
    pub generation: u64,

    pub built_at: DateTime<Utc>,
}

impl IndexSnapshot {
    /// The generation-0 snapshot engines start with before any build.
    pub fn empty() -> Self {
        Self {
            chunks: Vec::new(),
            lexical: LexicalIndex::default(),
            vector: None,
            generation: 0,
            built_at: Utc::now(),
        }
    }

    /// Build a snapshot over a chunk collection.
    pub fn build(chunks: Vec<Chunk>, generation: u64) -> Self {
        let lexical = LexicalIndex::build(&chunks);
        let vector = VectorIndex::build(&chunks);

        Self {
            chunks,
            lexical,
            vector,
            generation,
            built_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Number of chunks carrying embeddings.
    pub fn vector_indexed(&self) -> usize {
        self.vector.as_ref().map_or(0, |v| v.len())
    }

    /// Index kinds available in this snapshot, for health reporting.
    pub fn index_kinds(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }

        let mut kinds = vec!["lexical".to_string()];
        if self.vector.is_some() {
            kinds.push("vector".to_string());
        }
        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceRef;

    fn chunk(text: &str, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk {
            id: text.to_string(),
            text: text.to_string(),
            source_ref: SourceRef {
                file: "a.txt".to_string(),
                ordinal: 0,
                title: "a".to_string(),
            },
            embedding,
        }
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = IndexSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.generation, 0);
        assert!(snapshot.index_kinds().is_empty());
    }

    #[test]
    fn test_lexical_only_snapshot() {
        let snapshot = IndexSnapshot::build(vec![chunk("some text", None)], 1);
        assert_eq!(snapshot.index_kinds(), vec!["lexical"]);
        assert_eq!(snapshot.vector_indexed(), 0);
    }

    #[test]
    fn test_vector_snapshot() {
        let chunks = vec![
            chunk("embedded", Some(vec![1.0, 0.0])),
            chunk("not embedded", None),
        ];
        let snapshot = IndexSnapshot::build(chunks, 2);
        assert_eq!(snapshot.index_kinds(), vec!["lexical", "vector"]);
        assert_eq!(snapshot.vector_indexed(), 1);
        assert_eq!(snapshot.generation, 2);
    }
}
