//! End-to-end engine scenarios over a small on-disk corpus.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tempfile::TempDir;

use corpusqa_core::{AppError, AppResult};
use corpusqa_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};

use crate::config::EngineConfig;
use crate::embeddings::{EmbeddingProvider, MockEmbedder};
use crate::engine::QueryEngine;
use crate::synthesize::NO_ANSWER_TEXT;
use crate::types::{AnswerCondition, Degradation, QueryMode};

/// Completion stub that always returns the same text.
struct CannedClient {
    content: String,
}

#[async_trait::async_trait]
impl LlmClient for CannedClient {
    fn provider_name(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        Ok(LlmResponse {
            content: self.content.clone(),
            model: "canned".to_string(),
            usage: LlmUsage::default(),
        })
    }
}

/// Completion stub that always fails.
struct FailingClient;

#[async_trait::async_trait]
impl LlmClient for FailingClient {
    fn provider_name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &LlmRequest) -> AppResult<LlmResponse> {
        Err(AppError::Provider("completion backend down".to_string()))
    }
}

/// Embedder that never works.
struct DownEmbedder;

#[async_trait::async_trait]
impl EmbeddingProvider for DownEmbedder {
    fn provider_name(&self) -> &str {
        "down"
    }

    fn model_name(&self) -> &str {
        "down-v1"
    }

    async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Err(AppError::Provider("embedding backend down".to_string()))
    }
}

/// Embedder that works for the first call (index build) then fails, so
/// query-time embedding degradation can be exercised.
struct FlakyEmbedder {
    inner: MockEmbedder,
    calls: AtomicUsize,
}

impl FlakyEmbedder {
    fn new() -> Self {
        Self {
            inner: MockEmbedder::new(128),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    fn provider_name(&self) -> &str {
        "flaky"
    }

    fn model_name(&self) -> &str {
        "flaky-v1"
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.inner.embed_batch(texts).await
        } else {
            Err(AppError::Provider("embedding backend down".to_string()))
        }
    }
}

fn write_corpus(dir: &TempDir) {
    fs::write(
        dir.path().join("astronomicon.txt"),
        "The Astronomicon is a psychic beacon located on Terra. \
         It guides ships through the warp. \
         Thousands of choristers sustain the beacon's signal.",
    )
    .unwrap();
    fs::write(
        dir.path().join("navigation.txt"),
        "Navigators rely on the Astronomicon's light to steer vessels. \
         Without the beacon, long warp journeys become impossible.",
    )
    .unwrap();
    fs::write(
        dir.path().join("gardening.txt"),
        "Tomatoes grow best in well-drained soil with full sun. \
         Water deeply but infrequently to encourage strong roots.",
    )
    .unwrap();
}

fn engine_for(dir: &TempDir) -> QueryEngine {
    QueryEngine::new(dir.path(), EngineConfig::default())
}

#[tokio::test]
async fn test_basic_query_answers_with_citations() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir);
    let handle = engine.build_index().await.unwrap();
    assert_eq!(handle.generation, 1);
    assert!(handle.chunk_count >= 3);
    assert_eq!(handle.vector_indexed, 0);

    let answer = engine
        .query("Where is the psychic beacon located?", QueryMode::Basic)
        .await
        .unwrap();

    assert!(answer.text.contains("Terra"));
    assert!(!answer.citations.is_empty());
    assert!(answer
        .citations
        .iter()
        .any(|c| c.source_ref.file == "astronomicon.txt"));
    assert_eq!(answer.meta.mode_used, QueryMode::Basic);
    assert!(answer.meta.degradations.is_empty());
    assert!(answer.meta.condition.is_none());
}

#[tokio::test]
async fn test_single_file_single_citation() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("astronomicon.txt"),
        "The Astronomicon is a psychic beacon on Terra.",
    )
    .unwrap();

    let engine = engine_for(&dir);
    engine.build_index().await.unwrap();

    let answer = engine
        .query("What is the Astronomicon?", QueryMode::Basic)
        .await
        .unwrap();

    assert_eq!(
        answer.text,
        "The Astronomicon is a psychic beacon on Terra."
    );
    assert_eq!(answer.citations.len(), 1);
    assert_eq!(answer.citations[0].source_ref.file, "astronomicon.txt");
}

#[tokio::test]
async fn test_citations_carry_valid_scores_and_snippets() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir);
    engine.build_index().await.unwrap();

    let answer = engine
        .query("How do navigators steer vessels?", QueryMode::Basic)
        .await
        .unwrap();

    let config = EngineConfig::default();
    for citation in &answer.citations {
        assert!(citation.score > 0.0 && citation.score <= 1.0);
        assert!(!citation.snippet.is_empty());
        assert!(citation.snippet.chars().count() <= config.snippet_max_chars + 3);
    }
    // Rank order: scores never increase
    for pair in answer.citations.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn test_empty_corpus_yields_no_corpus_condition() {
    let dir = TempDir::new().unwrap();

    let engine = engine_for(&dir);
    let handle = engine.build_index().await.unwrap();
    assert_eq!(handle.chunk_count, 0);

    let answer = engine
        .query("anything at all", QueryMode::Basic)
        .await
        .unwrap();
    assert_eq!(answer.text, NO_ANSWER_TEXT);
    assert!(answer.citations.is_empty());
    assert_eq!(
        answer.meta.condition,
        Some(AnswerCondition::NoCorpusAvailable)
    );
}

#[tokio::test]
async fn test_unanswerable_query_yields_insufficient_context() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir);
    engine.build_index().await.unwrap();

    let answer = engine
        .query("quantum chromodynamics lagrangian", QueryMode::Basic)
        .await
        .unwrap();
    assert_eq!(answer.text, NO_ANSWER_TEXT);
    assert!(answer.citations.is_empty());
    assert_eq!(
        answer.meta.condition,
        Some(AnswerCondition::InsufficientContext)
    );
}

#[tokio::test]
async fn test_blank_question_is_rejected() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir);
    engine.build_index().await.unwrap();

    let result = engine.query("   ", QueryMode::Basic).await;
    assert!(matches!(result, Err(AppError::InvalidQuery(_))));
}

#[tokio::test]
async fn test_basic_mode_is_deterministic() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir);
    engine.build_index().await.unwrap();

    let first = engine
        .query("What sustains the beacon?", QueryMode::Basic)
        .await
        .unwrap();
    let second = engine
        .query("What sustains the beacon?", QueryMode::Basic)
        .await
        .unwrap();

    assert_eq!(first.text, second.text);
    let first_refs: Vec<_> = first.citations.iter().map(|c| &c.source_ref).collect();
    let second_refs: Vec<_> = second.citations.iter().map(|c| &c.source_ref).collect();
    assert_eq!(first_refs, second_refs);
}

#[tokio::test]
async fn test_rebuild_reproduces_chunk_ids() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir);
    let first = engine.build_index().await.unwrap();
    let answer_before = engine
        .query("psychic beacon", QueryMode::Basic)
        .await
        .unwrap();

    let second = engine.build_index().await.unwrap();
    assert_eq!(second.generation, first.generation + 1);
    assert_eq!(second.chunk_count, first.chunk_count);

    let answer_after = engine
        .query("psychic beacon", QueryMode::Basic)
        .await
        .unwrap();
    assert_eq!(answer_before.text, answer_after.text);
}

#[tokio::test]
async fn test_concurrent_builds_coalesce() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = Arc::new(engine_for(&dir));
    let (a, b) = tokio::join!(engine.build_index(), engine.build_index());
    let a = a.unwrap();
    let b = b.unwrap();

    // At most two generations ever exist; the waiter may coalesce onto
    // the winner's snapshot.
    assert!(a.generation >= 1 && b.generation >= 1);
    assert!(a.generation.max(b.generation) <= 2);
    assert_eq!(a.chunk_count, b.chunk_count);

    let health = engine.health().await;
    assert_eq!(health.generation, a.generation.max(b.generation));
}

#[tokio::test]
async fn test_augmented_mode_uses_completion() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir)
        .with_embedder(Arc::new(MockEmbedder::new(128)))
        .with_completion(Arc::new(CannedClient {
            content: "The beacon sits on Terra [1].".to_string(),
        }));

    let handle = engine.build_index().await.unwrap();
    assert!(handle.vector_indexed > 0);
    assert_eq!(handle.vector_indexed, handle.chunk_count);

    let answer = engine
        .query("Where is the beacon?", QueryMode::Augmented)
        .await
        .unwrap();
    assert_eq!(answer.text, "The beacon sits on Terra [1].");
    assert_eq!(answer.meta.mode_requested, QueryMode::Augmented);
    assert_eq!(answer.meta.mode_used, QueryMode::Augmented);
    assert!(answer.meta.degradations.is_empty());
    assert!(!answer.citations.is_empty());
}

#[tokio::test]
async fn test_completion_failure_falls_back_to_extractive() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir)
        .with_embedder(Arc::new(MockEmbedder::new(128)))
        .with_completion(Arc::new(FailingClient));

    engine.build_index().await.unwrap();

    let answer = engine
        .query("Where is the psychic beacon located?", QueryMode::Augmented)
        .await
        .unwrap();

    assert!(answer.text.contains("Terra"));
    assert_eq!(answer.meta.mode_requested, QueryMode::Augmented);
    assert_eq!(answer.meta.mode_used, QueryMode::Basic);
    assert!(answer
        .meta
        .degradations
        .contains(&Degradation::CompletionUnavailable));
    assert!(!answer.citations.is_empty());
}

#[tokio::test]
async fn test_embedding_failure_degrades_to_lexical() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    // Embeds successfully at index time, fails on every later call
    let engine = engine_for(&dir)
        .with_embedder(Arc::new(FlakyEmbedder::new()))
        .with_completion(Arc::new(CannedClient {
            content: "Grounded answer.".to_string(),
        }));

    let handle = engine.build_index().await.unwrap();
    assert!(handle.vector_indexed > 0);

    let answer = engine
        .query("Where is the psychic beacon located?", QueryMode::Augmented)
        .await
        .unwrap();

    assert!(answer
        .meta
        .degradations
        .contains(&Degradation::EmbeddingUnavailable));
    // Completion still worked; only retrieval degraded
    assert_eq!(answer.meta.mode_used, QueryMode::Augmented);
    assert!(!answer.citations.is_empty());
}

#[tokio::test]
async fn test_unembedded_index_reports_lexical_fallback() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    // Every build-time embedding fails, so the snapshot has no vector side
    let engine = engine_for(&dir)
        .with_embedder(Arc::new(DownEmbedder))
        .with_completion(Arc::new(CannedClient {
            content: "Grounded answer.".to_string(),
        }));

    let handle = engine.build_index().await.unwrap();
    assert_eq!(handle.vector_indexed, 0);

    let answer = engine
        .query("Where is the psychic beacon located?", QueryMode::Augmented)
        .await
        .unwrap();

    assert!(answer
        .meta
        .degradations
        .contains(&Degradation::EmbeddingUnavailable));
    // Completion still worked; only retrieval fell back to lexical
    assert_eq!(answer.meta.mode_used, QueryMode::Augmented);
    assert!(!answer.citations.is_empty());
}

#[tokio::test]
async fn test_augmented_without_providers_degrades_fully() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir);
    engine.build_index().await.unwrap();

    let answer = engine
        .query("Where is the psychic beacon located?", QueryMode::Augmented)
        .await
        .unwrap();

    assert!(answer.text.contains("Terra"));
    assert_eq!(answer.meta.mode_used, QueryMode::Basic);
    assert!(answer
        .meta
        .degradations
        .contains(&Degradation::CompletionUnavailable));
}

#[tokio::test]
async fn test_health_reflects_snapshot() {
    let dir = TempDir::new().unwrap();
    write_corpus(&dir);

    let engine = engine_for(&dir).with_embedder(Arc::new(MockEmbedder::new(128)));

    let before = engine.health().await;
    assert_eq!(before.generation, 0);
    assert_eq!(before.chunk_count, 0);
    assert!(before.index_kinds.is_empty());

    engine.build_index().await.unwrap();

    let after = engine.health().await;
    assert_eq!(after.generation, 1);
    assert!(after.chunk_count > 0);
    assert_eq!(after.index_kinds, vec!["lexical", "vector"]);
}

#[tokio::test]
async fn test_top_k_bounds_citation_count() {
    let dir = TempDir::new().unwrap();
    for i in 0..12 {
        fs::write(
            dir.path().join(format!("doc{:02}.txt", i)),
            format!("The beacon entry number {} mentions the beacon.", i),
        )
        .unwrap();
    }

    let mut config = EngineConfig::default();
    config.top_k = 25;
    let engine = QueryEngine::new(dir.path(), config);
    engine.build_index().await.unwrap();

    let answer = engine.query("beacon", QueryMode::Basic).await.unwrap();
    assert!(answer.citations.len() <= 10);
}
