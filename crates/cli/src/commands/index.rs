//! Index command handler.

use clap::Args;

use corpusqa_core::{config::AppConfig, AppResult};

/// Build the index over the corpus directory
#[derive(Args, Debug)]
pub struct IndexCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IndexCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Building index over {:?}", config.corpus_dir);

        let engine = super::build_engine(config)?;
        let handle = engine.build_index().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&handle)?);
            return Ok(());
        }

        if handle.chunk_count == 0 {
            println!(
                "No corpus content found in {:?}. Add .txt or .md files and re-run.",
                config.corpus_dir
            );
            return Ok(());
        }

        println!(
            "Indexed {} chunks ({} embedded), generation {}",
            handle.chunk_count, handle.vector_indexed, handle.generation
        );

        Ok(())
    }
}
