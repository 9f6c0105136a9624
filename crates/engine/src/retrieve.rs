//! Retrieval: score fusion and ranking over an index snapshot.
//!
//! The lexical signal is always computed. When a query embedding is
//! supplied and the snapshot has a vector index, the semantic signal is
//! fused in at a fixed weighting. Both signals are max-normalized to
//! [0, 1] per query before fusion so neither scale dominates.

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::snapshot::IndexSnapshot;
use crate::types::{RetrievalHit, RetrievalResult};

/// Outcome of one retrieval pass.
#[derive(Debug)]
pub struct RetrievalOutcome {
    pub result: RetrievalResult,

    /// True when the semantic signal contributed to the scores
    pub semantic_used: bool,
}

/// Retrieve the top chunks for a query against a snapshot.
///
/// `query_embedding` is `None` in basic mode or after an embedding
/// degradation; retrieval then runs lexical-only.
pub fn retrieve(
    snapshot: &IndexSnapshot,
    query: &str,
    query_embedding: Option<&[f32]>,
    config: &EngineConfig,
) -> RetrievalOutcome {
    if snapshot.is_empty() {
        return RetrievalOutcome {
            result: RetrievalResult::default(),
            semantic_used: false,
        };
    }

    let lexical_raw = snapshot.lexical.score(query);

    let semantic_raw: Vec<(usize, f32)> = match (query_embedding, &snapshot.vector) {
        (Some(embedding), Some(vector)) => vector.search(embedding, &snapshot.chunks),
        _ => Vec::new(),
    };
    let semantic_used = !semantic_raw.is_empty();

    let lexical = max_normalize(&lexical_raw);
    let semantic = max_normalize_pairs(&semantic_raw);

    // Candidates: anything either signal found
    let mut fused: HashMap<usize, f32> = HashMap::new();
    if semantic_used {
        for (&idx, &score) in &semantic {
            *fused.entry(idx).or_insert(0.0) += config.semantic_weight * score;
        }
        for (&idx, &score) in &lexical {
            *fused.entry(idx).or_insert(0.0) += config.lexical_weight * score;
        }
    } else {
        fused = lexical;
    }

    let mut ranked: Vec<(usize, f32)> = fused
        .into_iter()
        .filter(|&(_, score)| score >= config.relevance_floor)
        .collect();

    // Descending score; corpus order breaks ties for determinism
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(config.clamped_top_k());

    let hits = ranked
        .into_iter()
        .map(|(idx, score)| RetrievalHit {
            chunk: snapshot.chunks[idx].clone(),
            score,
        })
        .collect();

    RetrievalOutcome {
        result: RetrievalResult { hits },
        semantic_used,
    }
}

/// Divide every score by the per-query maximum, mapping to [0, 1].
///
/// Negative cosine similarities are clamped to zero first so the map is
/// well defined.
fn max_normalize(scores: &HashMap<usize, f32>) -> HashMap<usize, f32> {
    let max = scores.values().fold(0.0f32, |m, &s| m.max(s));
    if max <= 0.0 {
        return HashMap::new();
    }
    scores
        .iter()
        .filter(|&(_, &s)| s > 0.0)
        .map(|(&idx, &s)| (idx, s / max))
        .collect()
}

fn max_normalize_pairs(scores: &[(usize, f32)]) -> HashMap<usize, f32> {
    let as_map: HashMap<usize, f32> = scores
        .iter()
        .map(|&(idx, s)| (idx, s.max(0.0)))
        .collect();
    max_normalize(&as_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, SourceRef};

    fn chunk(file: &str, ordinal: u32, text: &str, embedding: Option<Vec<f32>>) -> Chunk {
        Chunk {
            id: format!("{}-{}", file, ordinal),
            text: text.to_string(),
            source_ref: SourceRef {
                file: file.to_string(),
                ordinal,
                title: file.to_string(),
            },
            embedding,
        }
    }

    #[test]
    fn test_lexical_only_ranking() {
        let snapshot = IndexSnapshot::build(
            vec![
                chunk("a.txt", 0, "the beacon shines dimly", None),
                chunk("a.txt", 1, "the psychic beacon on terra guides ships", None),
                chunk("b.txt", 0, "unrelated gardening advice", None),
            ],
            1,
        );
        let config = EngineConfig::default();

        let outcome = retrieve(&snapshot, "psychic beacon terra", None, &config);
        assert!(!outcome.semantic_used);
        assert_eq!(outcome.result.hits[0].chunk.source_ref.ordinal, 1);
        assert!(outcome
            .result
            .hits
            .iter()
            .all(|h| h.chunk.source_ref.file != "b.txt"));
    }

    #[test]
    fn test_scores_normalized_to_unit_range() {
        let snapshot = IndexSnapshot::build(
            vec![
                chunk("a.txt", 0, "beacon beacon beacon", None),
                chunk("a.txt", 1, "beacon once", None),
            ],
            1,
        );
        let config = EngineConfig::default();

        let outcome = retrieve(&snapshot, "beacon", None, &config);
        for hit in &outcome.result.hits {
            assert!(hit.score > 0.0 && hit.score <= 1.0);
        }
        assert!((outcome.result.hits[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ties_break_by_corpus_order() {
        let snapshot = IndexSnapshot::build(
            vec![
                chunk("a.txt", 0, "identical text here", None),
                chunk("b.txt", 0, "identical text here", None),
            ],
            1,
        );
        let config = EngineConfig::default();

        let outcome = retrieve(&snapshot, "identical text", None, &config);
        assert_eq!(outcome.result.hits.len(), 2);
        assert_eq!(outcome.result.hits[0].chunk.source_ref.file, "a.txt");
        assert_eq!(outcome.result.hits[1].chunk.source_ref.file, "b.txt");
    }

    #[test]
    fn test_top_k_truncation() {
        let chunks: Vec<Chunk> = (0..8)
            .map(|i| chunk("a.txt", i, &format!("beacon mention number {}", i), None))
            .collect();
        let snapshot = IndexSnapshot::build(chunks, 1);
        let mut config = EngineConfig::default();
        config.top_k = 3;

        let outcome = retrieve(&snapshot, "beacon", None, &config);
        assert_eq!(outcome.result.hits.len(), 3);
    }

    #[test]
    fn test_no_overlap_yields_empty_result() {
        let snapshot = IndexSnapshot::build(
            vec![chunk("a.txt", 0, "gardening advice", None)],
            1,
        );
        let config = EngineConfig::default();

        let outcome = retrieve(&snapshot, "quantum chromodynamics", None, &config);
        assert!(outcome.result.is_empty());
    }

    #[test]
    fn test_empty_snapshot_yields_empty_result() {
        let outcome = retrieve(
            &IndexSnapshot::empty(),
            "anything",
            None,
            &EngineConfig::default(),
        );
        assert!(outcome.result.is_empty());
        assert!(!outcome.semantic_used);
    }

    #[test]
    fn test_fusion_boosts_semantically_close_chunks() {
        let snapshot = IndexSnapshot::build(
            vec![
                chunk("a.txt", 0, "the beacon", Some(vec![0.0, 1.0])),
                chunk("a.txt", 1, "the beacon", Some(vec![1.0, 0.0])),
            ],
            1,
        );
        let config = EngineConfig::default();

        // Lexical scores tie; the query embedding points at chunk 1
        let outcome = retrieve(&snapshot, "beacon", Some(&[1.0, 0.0]), &config);
        assert!(outcome.semantic_used);
        assert_eq!(outcome.result.hits[0].chunk.source_ref.ordinal, 1);
        assert!(outcome.result.hits[0].score > outcome.result.hits[1].score);
    }

    #[test]
    fn test_missing_vector_index_degrades_to_lexical() {
        let snapshot = IndexSnapshot::build(
            vec![chunk("a.txt", 0, "the beacon", None)],
            1,
        );
        let config = EngineConfig::default();

        let outcome = retrieve(&snapshot, "beacon", Some(&[1.0, 0.0]), &config);
        assert!(!outcome.semantic_used);
        assert_eq!(outcome.result.hits.len(), 1);
    }

    #[test]
    fn test_negative_similarity_clamped() {
        let snapshot = IndexSnapshot::build(
            vec![chunk("a.txt", 0, "the beacon", Some(vec![-1.0, 0.0]))],
            1,
        );
        let config = EngineConfig::default();

        let outcome = retrieve(&snapshot, "beacon", Some(&[1.0, 0.0]), &config);
        // Semantic similarity is negative so only the lexical share remains
        let hit = &outcome.result.hits[0];
        assert!(hit.score > 0.0 && hit.score <= config.lexical_weight + 1e-6);
    }
}
