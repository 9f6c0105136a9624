//! Corpus chunking.
//!
//! Splits each source document into bounded-length chunks, preferring
//! paragraph and sentence boundaries. Content is never merged across files.

use sha2::{Digest, Sha256};
use text_splitter::TextSplitter;

use crate::config::EngineConfig;
use crate::corpus::SourceDocument;
use crate::types::{Chunk, SourceRef};

/// Split one document into chunks.
///
/// Chunk ids are derived from the file name, ordinal, and text, so an
/// unchanged corpus always reproduces the same ids.
pub fn chunk_document(doc: &SourceDocument, config: &EngineConfig) -> Vec<Chunk> {
    // text-splitter breaks at semantic boundaries (paragraphs, then
    // sentences) within the given size range
    let splitter = TextSplitter::new(config.chunk_target_size..config.chunk_max_size);

    let mut chunks = Vec::new();
    for piece in splitter.chunks(&doc.text) {
        let text = piece.trim();
        if text.is_empty() {
            continue;
        }

        let ordinal = chunks.len() as u32;
        chunks.push(Chunk {
            id: chunk_id(&doc.file, ordinal, text),
            text: text.to_string(),
            source_ref: SourceRef {
                file: doc.file.clone(),
                ordinal,
                title: doc.title.clone(),
            },
            embedding: None,
        });
    }

    tracing::debug!("Chunked {} into {} chunks", doc.file, chunks.len());
    chunks
}

/// Deterministic chunk id: first 16 hex chars of SHA-256 over
/// file name, ordinal, and chunk text.
fn chunk_id(file: &str, ordinal: u32, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file.as_bytes());
    hasher.update(b":");
    hasher.update(ordinal.to_le_bytes());
    hasher.update(b":");
    hasher.update(text.as_bytes());

    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}
