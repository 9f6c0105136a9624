//! Ask command handler.
//!
//! Indexes the corpus, runs one query through the engine, and prints the
//! answer with its citations.

use clap::Args;

use corpusqa_core::{config::AppConfig, AppError, AppResult};
use corpusqa_engine::{Answer, QueryMode};

/// Ask a question against the indexed corpus
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: String,

    /// Query mode (basic, augmented)
    #[arg(short = 'M', long, default_value = "basic")]
    pub mode: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mode = QueryMode::parse(&self.mode).ok_or_else(|| {
            AppError::InvalidQuery(format!(
                "Unknown mode: '{}'. Supported modes: basic, augmented",
                self.mode
            ))
        })?;

        tracing::info!("Asking in {} mode", mode.as_str());

        let engine = super::build_engine(config)?;
        engine.build_index().await?;

        let answer = engine.query(&self.question, mode).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&answer)?);
            return Ok(());
        }

        print_answer(&answer);
        Ok(())
    }
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.text);

    if !answer.citations.is_empty() {
        println!();
        println!("Sources:");
        for (i, citation) in answer.citations.iter().enumerate() {
            println!(
                "  [{}] {} (chunk {}, score {:.2}) - {}",
                i + 1,
                citation.source_ref.file,
                citation.source_ref.ordinal,
                citation.score,
                citation.source_ref.title
            );
        }
    }

    if !answer.meta.degradations.is_empty() {
        println!();
        for degradation in &answer.meta.degradations {
            let note = match degradation {
                corpusqa_engine::Degradation::EmbeddingUnavailable => {
                    "embedding provider unavailable; used lexical retrieval only"
                }
                corpusqa_engine::Degradation::CompletionUnavailable => {
                    "completion provider unavailable; used extractive synthesis"
                }
            };
            println!("note: {}", note);
        }
    }
}
