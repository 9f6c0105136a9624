//! Citation assembly.
//!
//! Citations are derived purely from the retrieval result, in rank order,
//! so every citation points at a chunk the answer actually drew on.

use crate::config::EngineConfig;
use crate::types::{Citation, RetrievalResult};

/// Build citations for every retrieved chunk, preserving rank order.
pub fn assemble(retrieved: &RetrievalResult, config: &EngineConfig) -> Vec<Citation> {
    retrieved
        .hits
        .iter()
        .map(|hit| Citation {
            source_ref: hit.chunk.source_ref.clone(),
            snippet: snippet(&hit.chunk.text, config.snippet_max_chars),
            score: hit.score,
        })
        .collect()
}

/// Bounded excerpt, cut at the last whitespace before the cap.
fn snippet(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let cut = match cut.rfind(char::is_whitespace) {
        Some(pos) => &cut[..pos],
        None => &cut,
    };
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Chunk, RetrievalHit, SourceRef};

    fn hit(file: &str, ordinal: u32, text: &str, score: f32) -> RetrievalHit {
        RetrievalHit {
            chunk: Chunk {
                id: format!("{}-{}", file, ordinal),
                text: text.to_string(),
                source_ref: SourceRef {
                    file: file.to_string(),
                    ordinal,
                    title: file.to_string(),
                },
                embedding: None,
            },
            score,
        }
    }

    #[test]
    fn test_citations_preserve_rank_order() {
        let retrieved = RetrievalResult {
            hits: vec![
                hit("b.txt", 2, "highest", 0.9),
                hit("a.txt", 0, "second", 0.7),
            ],
        };

        let citations = assemble(&retrieved, &EngineConfig::default());
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].source_ref.file, "b.txt");
        assert_eq!(citations[0].source_ref.ordinal, 2);
        assert!((citations[0].score - 0.9).abs() < 1e-6);
        assert_eq!(citations[1].source_ref.file, "a.txt");
    }

    #[test]
    fn test_snippet_bounded() {
        let long = "word ".repeat(200);
        let retrieved = RetrievalResult {
            hits: vec![hit("a.txt", 0, &long, 1.0)],
        };

        let citations = assemble(&retrieved, &EngineConfig::default());
        assert!(citations[0].snippet.chars().count() <= 303);
        assert!(citations[0].snippet.ends_with("..."));
    }

    #[test]
    fn test_short_text_kept_verbatim() {
        let retrieved = RetrievalResult {
            hits: vec![hit("a.txt", 0, "  short text  ", 1.0)],
        };

        let citations = assemble(&retrieved, &EngineConfig::default());
        assert_eq!(citations[0].snippet, "short text");
    }

    #[test]
    fn test_snippet_cuts_on_char_boundary() {
        let text = "é".repeat(400);
        assert!(snippet(&text, 300).chars().count() <= 303);
    }

    #[test]
    fn test_empty_result_yields_no_citations() {
        let citations = assemble(&RetrievalResult::default(), &EngineConfig::default());
        assert!(citations.is_empty());
    }
}
