//! corpusqa CLI
//!
//! Main entry point for the corpusqa command-line tool.
//! Ask questions against a plain-text corpus and get answers with
//! citations back into the source files.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, HealthCommand, IndexCommand};
use corpusqa_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// corpusqa - question answering over a local text corpus, with citations
#[derive(Parser, Debug)]
#[command(name = "corpusqa")]
#[command(about = "Ask questions against a plain-text corpus with cited answers", long_about = None)]
#[command(version)]
struct Cli {
    /// Directory containing the corpus (.txt/.md files)
    #[arg(short = 'd', long, global = true, env = "CORPUSQA_CORPUS_DIR")]
    corpus_dir: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "CORPUSQA_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Provider for embeddings and completions (openai, ollama)
    #[arg(short, long, global = true, env = "CORPUSQA_PROVIDER")]
    provider: Option<String>,

    /// Completion model identifier
    #[arg(short, long, global = true, env = "CORPUSQA_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the index over the corpus directory
    Index(IndexCommand),

    /// Ask a question against the indexed corpus
    Ask(AskCommand),

    /// Show index health (chunk count, index kinds, generation)
    Health(HealthCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = AppConfig::load()?;
    let config = config.with_overrides(
        cli.corpus_dir,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("corpusqa starting");
    tracing::debug!("Corpus dir: {:?}", config.corpus_dir);
    tracing::debug!("Provider: {}", config.provider);

    config.validate()?;

    let command_name = match &cli.command {
        Commands::Index(_) => "index",
        Commands::Ask(_) => "ask",
        Commands::Health(_) => "health",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Health(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
