//! Configuration management for corpusqa.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - Config files (corpusqa.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! Retrieval tunables (top-k, chunk sizing, relevance floor) are carried here
//! as optional overrides; the engine crate owns their documented defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory containing the text corpus (.txt/.md files)
    pub corpus_dir: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Provider for embeddings and completions (e.g., "openai", "ollama")
    pub provider: String,

    /// Completion model identifier
    pub completion_model: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Optional custom provider endpoint
    pub endpoint: Option<String>,

    /// API key for the provider
    pub api_key: Option<String>,

    /// Number of chunks to retrieve per query
    pub top_k: Option<usize>,

    /// Target chunk size in characters
    pub chunk_target_size: Option<usize>,

    /// Minimum normalized relevance for a chunk to be cited
    pub relevance_floor: Option<f32>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    corpus: Option<CorpusConfig>,
    provider: Option<ProviderConfig>,
    retrieval: Option<RetrievalConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorpusConfig {
    dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProviderConfig {
    name: Option<String>,
    #[serde(rename = "completionModel")]
    completion_model: Option<String>,
    #[serde(rename = "embeddingModel")]
    embedding_model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "apiKeyEnv")]
    api_key_env: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RetrievalConfig {
    #[serde(rename = "topK")]
    top_k: Option<usize>,
    #[serde(rename = "chunkTargetSize")]
    chunk_target_size: Option<usize>,
    #[serde(rename = "relevanceFloor")]
    relevance_floor: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            corpus_dir: PathBuf::from("data"),
            config_file: None,
            provider: "openai".to_string(),
            completion_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            endpoint: None,
            api_key: None,
            top_k: None,
            chunk_target_size: None,
            relevance_floor: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `CORPUSQA_CORPUS_DIR`: Override corpus directory
    /// - `CORPUSQA_CONFIG`: Path to config file
    /// - `CORPUSQA_PROVIDER`: Provider name
    /// - `CORPUSQA_MODEL`: Completion model identifier
    /// - `CORPUSQA_EMBEDDING_MODEL`: Embedding model identifier
    /// - `CORPUSQA_API_KEY` / `OPENAI_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("CORPUSQA_CORPUS_DIR") {
            config.corpus_dir = PathBuf::from(dir);
        }

        if let Ok(config_file) = std::env::var("CORPUSQA_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        // Load from YAML config file if it exists
        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| PathBuf::from("corpusqa.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("CORPUSQA_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("CORPUSQA_MODEL") {
            config.completion_model = model;
        }

        if let Ok(model) = std::env::var("CORPUSQA_EMBEDDING_MODEL") {
            config.embedding_model = model;
        }

        if config.api_key.is_none() {
            config.api_key = std::env::var("CORPUSQA_API_KEY")
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok();
        }

        config.log_level = std::env::var("RUST_LOG").ok().or(config.log_level);

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(corpus) = config_file.corpus {
            if let Some(dir) = corpus.dir {
                result.corpus_dir = PathBuf::from(dir);
            }
        }

        if let Some(provider) = config_file.provider {
            if let Some(name) = provider.name {
                result.provider = name;
            }
            if let Some(model) = provider.completion_model {
                result.completion_model = model;
            }
            if let Some(model) = provider.embedding_model {
                result.embedding_model = model;
            }
            if provider.endpoint.is_some() {
                result.endpoint = provider.endpoint;
            }
            if let Some(env_var) = provider.api_key_env {
                if let Ok(key) = std::env::var(&env_var) {
                    result.api_key = Some(key);
                }
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            if retrieval.top_k.is_some() {
                result.top_k = retrieval.top_k;
            }
            if retrieval.chunk_target_size.is_some() {
                result.chunk_target_size = retrieval.chunk_target_size;
            }
            if retrieval.relevance_floor.is_some() {
                result.relevance_floor = retrieval.relevance_floor;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        corpus_dir: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(corpus_dir) = corpus_dir {
            self.corpus_dir = corpus_dir;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.completion_model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Whether augmented-mode prerequisites are satisfied for this provider.
    ///
    /// OpenAI needs an API key; Ollama is local and needs none. Without
    /// these, augmented queries degrade to basic mode.
    pub fn augmentation_available(&self) -> bool {
        match self.provider.as_str() {
            "openai" => self.api_key.is_some(),
            "ollama" => true,
            _ => false,
        }
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["openai", "ollama"];

        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        Ok(())
    }
}
