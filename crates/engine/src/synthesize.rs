//! Answer synthesis over retrieved chunks.
//!
//! Two strategies behind one trait: extractive (deterministic sentence
//! selection, no external calls) and generative (LLM completion grounded
//! in the retrieved context). The engine falls back from generative to
//! extractive when the completion provider fails.

use async_trait::async_trait;
use corpusqa_core::AppResult;
use corpusqa_llm::{LlmClient, LlmRequest};

use crate::config::EngineConfig;
use crate::lexical::tokenize;
use crate::types::RetrievalResult;

/// Placeholder text for queries the corpus cannot answer.
pub const NO_ANSWER_TEXT: &str = "I cannot find this in the documents.";

/// A synthesis strategy: turn retrieved chunks into answer text.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn synthesize(&self, question: &str, retrieved: &RetrievalResult)
        -> AppResult<String>;
}

/// Deterministic extractive synthesis.
///
/// Selects the sentences from the retrieved chunks that best overlap the
/// question, in retrieval-rank order. Identical inputs always produce the
/// identical answer.
pub struct ExtractiveSynthesizer {
    max_sentences: usize,
    max_chars: usize,
}

impl ExtractiveSynthesizer {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            max_sentences: config.answer_max_sentences,
            max_chars: config.answer_max_chars,
        }
    }

    fn compose(&self, question: &str, retrieved: &RetrievalResult) -> String {
        let budget = self.sentence_budget(question);

        // (retrieval rank, position within chunk) keeps selection stable
        let mut candidates: Vec<(usize, usize, f32, String)> = Vec::new();
        for (rank, hit) in retrieved.hits.iter().enumerate() {
            for (pos, sentence) in split_sentences(&hit.chunk.text).into_iter().enumerate() {
                let score = sentence_score(question, &sentence);
                if score > 0.0 {
                    candidates.push((rank, pos, score, sentence));
                }
            }
        }

        if candidates.is_empty() {
            return NO_ANSWER_TEXT.to_string();
        }

        candidates.sort_by(|a, b| {
            b.2.total_cmp(&a.2)
                .then(a.0.cmp(&b.0))
                .then(a.1.cmp(&b.1))
        });

        let mut selected: Vec<(usize, usize, String)> = Vec::new();
        let mut seen: Vec<String> = Vec::new();
        for (rank, pos, _, sentence) in candidates {
            let key = sentence.to_lowercase();
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            selected.push((rank, pos, sentence));
            if selected.len() >= budget {
                break;
            }
        }

        // Present in source order, not score order, so the answer reads well
        selected.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

        let answer = selected
            .into_iter()
            .map(|(_, _, s)| s)
            .collect::<Vec<_>>()
            .join(" ");

        cap_chars(&answer, self.max_chars)
    }

    /// Questions asking for enumeration or comparison get one extra
    /// sentence of budget.
    fn sentence_budget(&self, question: &str) -> usize {
        const DETAIL_MARKERS: &[&str] = &[
            "list", "compare", "difference", "who", "what is", "what are",
        ];
        let lower = question.to_lowercase();
        if DETAIL_MARKERS.iter().any(|m| lower.contains(m)) {
            self.max_sentences + 1
        } else {
            self.max_sentences
        }
    }
}

#[async_trait]
impl Synthesizer for ExtractiveSynthesizer {
    async fn synthesize(
        &self,
        question: &str,
        retrieved: &RetrievalResult,
    ) -> AppResult<String> {
        Ok(self.compose(question, retrieved))
    }
}

/// LLM-backed synthesis grounded in the retrieved chunks.
pub struct GenerativeSynthesizer {
    client: std::sync::Arc<dyn LlmClient>,
    model: String,
}

impl GenerativeSynthesizer {
    pub fn new(client: std::sync::Arc<dyn LlmClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    fn build_prompt(question: &str, retrieved: &RetrievalResult) -> (String, String) {
        let mut context = String::new();
        for (i, hit) in retrieved.hits.iter().enumerate() {
            context.push_str(&format!("[{}] {}\n\n", i + 1, hit.chunk.text.trim()));
        }

        let system = format!(
            "You answer questions using only the numbered context passages below. \
             If the context does not contain the answer, reply exactly: {}\n\n\
             Context:\n{}",
            NO_ANSWER_TEXT, context
        );

        (system, question.to_string())
    }
}

#[async_trait]
impl Synthesizer for GenerativeSynthesizer {
    async fn synthesize(
        &self,
        question: &str,
        retrieved: &RetrievalResult,
    ) -> AppResult<String> {
        let (system, prompt) = Self::build_prompt(question, retrieved);
        let request = LlmRequest::new(&prompt, &self.model)
            .with_system(&system)
            .with_temperature(0.0);

        let response = self.client.complete(&request).await?;
        let text = response.content.trim().to_string();
        if text.is_empty() {
            return Ok(NO_ANSWER_TEXT.to_string());
        }
        Ok(text)
    }
}

/// Split text into sentences at '.', '!', '?' followed by whitespace or EOF.
///
/// Deliberately simple; capped to avoid pathological inputs dominating
/// candidate selection.
fn split_sentences(text: &str) -> Vec<String> {
    const MAX_SENTENCES: usize = 50;

    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let boundary = chars.peek().map_or(true, |n| n.is_whitespace());
            if boundary {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    sentences.push(trimmed.to_string());
                    if sentences.len() >= MAX_SENTENCES {
                        return sentences;
                    }
                }
                current.clear();
            }
        }
    }

    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }

    sentences
}

/// Relevance of one sentence to the question.
///
/// Token overlap (Jaccard) dominates; a small brevity bonus prefers the
/// tighter of two equally-relevant sentences.
fn sentence_score(question: &str, sentence: &str) -> f32 {
    let mut q_tokens = tokenize(question);
    q_tokens.sort();
    q_tokens.dedup();
    let mut s_tokens = tokenize(sentence);
    s_tokens.sort();
    s_tokens.dedup();

    if q_tokens.is_empty() || s_tokens.is_empty() {
        return 0.0;
    }

    let overlap = s_tokens.iter().filter(|t| q_tokens.contains(t)).count() as f32;
    if overlap == 0.0 {
        return 0.0;
    }

    let union = (q_tokens.len() + s_tokens.len()) as f32 - overlap;
    let jaccard = overlap / union;
    let brevity = 1.0 / (1.0 + (1.0 + s_tokens.len() as f32).log2());

    jaccard * 0.9 + brevity * 0.1
}

/// Truncate on a char boundary at the last whitespace before the cap.
fn cap_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(pos) => &cut[..pos],
        None => &cut,
    };
    format!("{}…", cut.trim_end())
}
