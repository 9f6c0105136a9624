//! Retrieval engine type definitions.

use serde::{Deserialize, Serialize};

/// Structured provenance for a chunk: where in the corpus it came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Originating file name (e.g., "astronomicon.txt")
    pub file: String,

    /// Ordinal position of the chunk within the file (0-indexed)
    pub ordinal: u32,

    /// Human-readable title or label for the source
    pub title: String,
}

/// An immutable, provenance-tagged span of corpus text.
///
/// Chunks are created during indexing, never mutated, and regenerated
/// wholesale when the corpus is re-indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable identifier derived from source file, ordinal, and content.
    /// Deterministic given stable input.
    pub id: String,

    /// Chunk text content (always non-empty)
    pub text: String,

    /// Provenance back to the corpus
    pub source_ref: SourceRef,

    /// Embedding vector; present only when the vector index was built and
    /// this chunk's embedding call succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Requested operating mode for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryMode {
    /// Lexical retrieval + extractive synthesis; no external calls
    #[default]
    Basic,

    /// Embedding-augmented retrieval + generative synthesis
    Augmented,
}

impl QueryMode {
    /// Parse a mode string ("basic" | "augmented").
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Some(Self::Basic),
            "augmented" => Some(Self::Augmented),
            _ => None,
        }
    }

    /// Get the canonical mode name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Augmented => "augmented",
        }
    }
}

/// A retrieved chunk with its relevance score.
#[derive(Debug, Clone)]
pub struct RetrievalHit {
    pub chunk: Chunk,
    pub score: f32,
}

/// Ranked retrieval output for one query.
///
/// Hits are strictly ordered by descending score; ties are broken by
/// corpus order (file order, then position) for determinism.
#[derive(Debug, Clone, Default)]
pub struct RetrievalResult {
    pub hits: Vec<RetrievalHit>,
}

impl RetrievalResult {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// Expected, non-fatal fallbacks that occurred while answering a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degradation {
    /// Embedding provider call failed; retrieval fell back to lexical-only
    EmbeddingUnavailable,

    /// Completion provider call failed; synthesis fell back to extractive
    CompletionUnavailable,
}

/// Why a query produced an empty or placeholder answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerCondition {
    /// The corpus was empty or unreadable at index time
    NoCorpusAvailable,

    /// Retrieval found nothing above the relevance floor
    InsufficientContext,
}

/// Query metadata attached to every answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerMeta {
    /// Mode the caller asked for
    pub mode_requested: QueryMode,

    /// Mode actually used after prerequisite checks and fallbacks
    pub mode_used: QueryMode,

    /// Graceful fallbacks taken while answering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degradations: Vec<Degradation>,

    /// Set when the answer is a placeholder rather than a real answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<AnswerCondition>,

    /// End-to-end latency in milliseconds
    pub latency_ms: u64,
}

/// A provenance record binding part of an answer to a retrieved chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Where the supporting chunk came from
    pub source_ref: SourceRef,

    /// Short excerpt of the chunk's text (bounded length)
    pub snippet: String,

    /// Relevance score the chunk was retrieved with
    pub score: f32,
}

/// Final answer object returned by the engine.
///
/// Invariant: every citation's `source_ref` corresponds to a chunk present
/// in the retrieval result that produced this answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text
    pub text: String,

    /// Supporting chunks in retrieval-rank order
    pub citations: Vec<Citation>,

    /// Query metadata
    pub meta: AnswerMeta,
}

/// Summary of a completed index build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexHandle {
    /// Monotonic snapshot generation
    pub generation: u64,

    /// Number of chunks in the snapshot
    pub chunk_count: usize,

    /// Number of chunks with embeddings in the vector index
    pub vector_indexed: usize,
}

/// Cheap introspection for liveness reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Number of chunks in the current snapshot
    pub chunk_count: usize,

    /// Index kinds available ("lexical", "vector")
    pub index_kinds: Vec<String>,

    /// Current snapshot generation
    pub generation: u64,
}
