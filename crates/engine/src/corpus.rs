//! Corpus loading and ingestion filters.
//!
//! Reads text sources (.txt/.md) from the corpus directory in stable sorted
//! order. Helper files (names starting with '_' or containing "prompts")
//! and UI/testing prompt sections are excluded from retrieval.

use std::path::Path;

use walkdir::WalkDir;

/// A raw corpus document before chunking.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// File name relative to the corpus directory
    pub file: String,

    /// Human-readable title (first markdown heading or file stem)
    pub title: String,

    /// Full document text after ingestion filters
    pub text: String,
}

/// Load all text sources from the corpus directory.
///
/// An empty or unreadable directory yields zero documents; unreadable
/// individual files are skipped instead of failing the pipeline.
pub fn load_corpus(dir: &Path) -> Vec<SourceDocument> {
    if !dir.is_dir() {
        tracing::warn!("Corpus directory {:?} does not exist or is not a directory", dir);
        return Vec::new();
    }

    let mut paths: Vec<_> = WalkDir::new(dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .filter(|e| is_text_source(e.path()))
        .map(|e| e.path().to_path_buf())
        .collect();

    // Stable order: file order determines corpus order for tie-breaking
    paths.sort();

    let mut docs = Vec::new();
    for path in paths {
        let file = path
            .strip_prefix(dir)
            .unwrap_or(&path)
            .to_string_lossy()
            .to_string();

        if is_helper_file(&file) {
            tracing::debug!("Skipping helper file: {}", file);
            continue;
        }

        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                // Skip unreadable files instead of failing the pipeline
                tracing::warn!("Skipping unreadable file {:?}: {}", path, e);
                continue;
            }
        };

        let text = strip_ignored_sections(&raw);
        if text.is_empty() {
            continue;
        }

        let title = extract_title(&file, &text);
        docs.push(SourceDocument { file, title, text });
    }

    tracing::info!("Loaded {} corpus documents from {:?}", docs.len(), dir);
    docs
}

/// Only .txt and .md files are corpus sources.
fn is_text_source(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("txt") | Some("md")
    )
}

/// Helper files are excluded from indexing: names starting with '_'
/// or containing "prompts".
fn is_helper_file(file: &str) -> bool {
    let base = file.rsplit('/').next().unwrap_or(file);
    base.starts_with('_') || base.to_lowercase().contains("prompts")
}

/// Remove UI/testing prompt sections from retrieval.
///
/// Cuts from a "SECTION: PROMPTS" header to the next "SECTION:" header
/// or EOF. Safe no-op if absent.
fn strip_ignored_sections(text: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut skipping = false;

    for line in text.lines() {
        if is_section_header(line) {
            skipping = is_prompts_header(line);
            if skipping {
                continue;
            }
        }
        if !skipping {
            kept.push(line);
        }
    }

    kept.join("\n").trim().to_string()
}

/// A section header line looks like "SECTION: <name>", optionally preceded
/// by '=' padding or whitespace.
fn is_section_header(line: &str) -> bool {
    let trimmed = line.trim_start_matches(|c: char| c == '=' || c.is_whitespace());
    trimmed
        .get(..8)
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case("section:"))
}

fn is_prompts_header(line: &str) -> bool {
    let trimmed = line.trim_start_matches(|c: char| c == '=' || c.is_whitespace());
    trimmed
        .get(8..)
        .map_or(false, |rest| rest.trim().to_lowercase().starts_with("prompts"))
}

/// Title is the first markdown heading if present, otherwise the file stem.
fn extract_title(file: &str, text: &str) -> String {
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(heading) = trimmed.strip_prefix('#') {
            let heading = heading.trim_start_matches('#').trim();
            if !heading.is_empty() {
                return heading.to_string();
            }
        }
    }

    let base = file.rsplit('/').next().unwrap_or(file);
    base.rsplit_once('.')
        .map(|(stem, _)| stem.to_string())
        .unwrap_or_else(|| base.to_string())
}
