//! Query engine facade.
//!
//! Owns the current index snapshot and the provider handles, and drives
//! the full pipeline: index builds with atomic snapshot swaps, and queries
//! through retrieval, synthesis, and citation assembly.
//!
//! Provider failures degrade the answer instead of failing the query; the
//! only hard query error is malformed input.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock};

use corpusqa_core::{AppError, AppResult};
use corpusqa_llm::LlmClient;

use crate::chunker::chunk_document;
use crate::citations;
use crate::config::EngineConfig;
use crate::corpus::load_corpus;
use crate::embeddings::EmbeddingProvider;
use crate::retrieve::retrieve;
use crate::snapshot::IndexSnapshot;
use crate::synthesize::{
    ExtractiveSynthesizer, GenerativeSynthesizer, Synthesizer, NO_ANSWER_TEXT,
};
use crate::types::{
    Answer, AnswerCondition, AnswerMeta, Chunk, Degradation, HealthReport, IndexHandle,
    QueryMode,
};

/// Embedding batch size for index builds.
const EMBED_BATCH_SIZE: usize = 32;

/// The retrieval-and-citation engine.
///
/// Cheap to share behind an `Arc`; queries take read access to the current
/// snapshot while rebuilds prepare the next one off to the side.
pub struct QueryEngine {
    config: EngineConfig,
    corpus_dir: PathBuf,

    /// Optional embedding capability; absent in basic-only deployments
    embedder: Option<Arc<dyn EmbeddingProvider>>,

    /// Optional completion capability for generative synthesis
    completion: Option<Arc<dyn LlmClient>>,

    snapshot: RwLock<Arc<IndexSnapshot>>,

    /// Serializes index builds; concurrent callers coalesce onto one build
    build_lock: Mutex<()>,
}

impl QueryEngine {
    pub fn new(corpus_dir: impl Into<PathBuf>, config: EngineConfig) -> Self {
        Self {
            config,
            corpus_dir: corpus_dir.into(),
            embedder: None,
            completion: None,
            snapshot: RwLock::new(Arc::new(IndexSnapshot::empty())),
            build_lock: Mutex::new(()),
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn with_completion(mut self, completion: Arc<dyn LlmClient>) -> Self {
        self.completion = Some(completion);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Rebuild the index from the corpus directory and swap it in.
    ///
    /// Always a full rebuild. Concurrent calls coalesce: a caller that
    /// waited out another build observes the fresh snapshot and returns its
    /// handle instead of rebuilding again. Queries in flight keep reading
    /// the snapshot they started with.
    pub async fn build_index(&self) -> AppResult<IndexHandle> {
        let entry_generation = self.snapshot.read().await.generation;

        let _guard = self.build_lock.lock().await;

        // Another build finished while we waited for the lock
        {
            let current = self.snapshot.read().await;
            if current.generation > entry_generation {
                tracing::debug!(
                    "Index build coalesced onto generation {}",
                    current.generation
                );
                return Ok(handle_of(&current));
            }
        }

        let started = Instant::now();
        let documents = load_corpus(&self.corpus_dir);

        let mut chunks: Vec<Chunk> = Vec::new();
        for doc in &documents {
            chunks.extend(chunk_document(doc, &self.config));
        }

        if let Some(embedder) = &self.embedder {
            embed_chunks(embedder.as_ref(), &mut chunks).await;
        }

        let generation = entry_generation + 1;
        let next = Arc::new(IndexSnapshot::build(chunks, generation));
        let handle = handle_of(&next);

        {
            let mut current = self.snapshot.write().await;
            *current = next;
        }

        tracing::info!(
            "Index generation {} built: {} chunks ({} embedded) in {} ms",
            handle.generation,
            handle.chunk_count,
            handle.vector_indexed,
            started.elapsed().as_millis()
        );

        Ok(handle)
    }

    /// Answer a question against the current snapshot.
    ///
    /// The only hard error is a blank question; everything else comes back
    /// as a well-formed answer, possibly a placeholder with its condition
    /// and degradations recorded in the metadata.
    pub async fn query(&self, question: &str, mode: QueryMode) -> AppResult<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::InvalidQuery(
                "Question must not be empty".to_string(),
            ));
        }

        let started = Instant::now();
        let snapshot = self.snapshot.read().await.clone();

        if snapshot.is_empty() {
            tracing::warn!("Query against empty corpus");
            return Ok(placeholder_answer(
                mode,
                AnswerCondition::NoCorpusAvailable,
                Vec::new(),
                started,
            ));
        }

        let mut degradations = Vec::new();

        // Query embedding only matters in augmented mode and only when the
        // snapshot actually has a vector side to search.
        let query_embedding = if mode == QueryMode::Augmented {
            match (&self.embedder, &snapshot.vector) {
                (Some(embedder), Some(_)) => match embedder.embed(question).await {
                    Ok(embedding) => Some(embedding),
                    Err(e) => {
                        tracing::warn!("Query embedding failed, using lexical only: {}", e);
                        degradations.push(Degradation::EmbeddingUnavailable);
                        None
                    }
                },
                // No embedder configured, or nothing embedded at index
                // time: semantic retrieval cannot run, record the fallback
                _ => {
                    degradations.push(Degradation::EmbeddingUnavailable);
                    None
                }
            }
        } else {
            None
        };

        let outcome = retrieve(
            &snapshot,
            question,
            query_embedding.as_deref(),
            &self.config,
        );

        if outcome.result.is_empty() {
            return Ok(placeholder_answer(
                mode,
                AnswerCondition::InsufficientContext,
                degradations,
                started,
            ));
        }

        let extractive = ExtractiveSynthesizer::new(&self.config);
        let (text, mode_used) = if mode == QueryMode::Augmented {
            match &self.completion {
                Some(client) => {
                    let generative =
                        GenerativeSynthesizer::new(client.clone(), &self.config.completion_model);
                    match generative.synthesize(question, &outcome.result).await {
                        Ok(text) => (text, QueryMode::Augmented),
                        Err(e) => {
                            tracing::warn!(
                                "Generative synthesis failed, falling back to extractive: {}",
                                e
                            );
                            degradations.push(Degradation::CompletionUnavailable);
                            let text = extractive.synthesize(question, &outcome.result).await?;
                            (text, QueryMode::Basic)
                        }
                    }
                }
                None => {
                    degradations.push(Degradation::CompletionUnavailable);
                    let text = extractive.synthesize(question, &outcome.result).await?;
                    (text, QueryMode::Basic)
                }
            }
        } else {
            let text = extractive.synthesize(question, &outcome.result).await?;
            (text, QueryMode::Basic)
        };

        let citations = citations::assemble(&outcome.result, &self.config);

        Ok(Answer {
            text,
            citations,
            meta: AnswerMeta {
                mode_requested: mode,
                mode_used,
                degradations,
                condition: None,
                latency_ms: started.elapsed().as_millis() as u64,
            },
        })
    }

    /// Cheap liveness introspection; never touches providers.
    pub async fn health(&self) -> HealthReport {
        let snapshot = self.snapshot.read().await;
        HealthReport {
            chunk_count: snapshot.chunks.len(),
            index_kinds: snapshot.index_kinds(),
            generation: snapshot.generation,
        }
    }
}

fn handle_of(snapshot: &IndexSnapshot) -> IndexHandle {
    IndexHandle {
        generation: snapshot.generation,
        chunk_count: snapshot.chunks.len(),
        vector_indexed: snapshot.vector_indexed(),
    }
}

fn placeholder_answer(
    mode: QueryMode,
    condition: AnswerCondition,
    degradations: Vec<Degradation>,
    started: Instant,
) -> Answer {
    Answer {
        text: NO_ANSWER_TEXT.to_string(),
        citations: Vec::new(),
        meta: AnswerMeta {
            mode_requested: mode,
            mode_used: QueryMode::Basic,
            degradations,
            condition: Some(condition),
            latency_ms: started.elapsed().as_millis() as u64,
        },
    }
}

/// Attach embeddings to chunks, batch by batch.
///
/// A failed batch is tolerated: its chunks stay unembedded and are served
/// by the lexical index alone.
async fn embed_chunks(embedder: &dyn EmbeddingProvider, chunks: &mut [Chunk]) {
    for batch in chunks.chunks_mut(EMBED_BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();

        match embedder.embed_batch(&texts).await {
            Ok(embeddings) if embeddings.len() == batch.len() => {
                for (chunk, embedding) in batch.iter_mut().zip(embeddings) {
                    chunk.embedding = Some(embedding);
                }
            }
            Ok(embeddings) => {
                tracing::warn!(
                    "Embedding batch size mismatch ({} for {}), skipping batch",
                    embeddings.len(),
                    batch.len()
                );
            }
            Err(e) => {
                tracing::warn!("Embedding batch failed, indexing lexically only: {}", e);
            }
        }
    }
}
