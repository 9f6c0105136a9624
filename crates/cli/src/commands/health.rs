//! Health command handler.

use clap::Args;

use corpusqa_core::{config::AppConfig, AppResult};

/// Show index health (chunk count, index kinds, generation)
#[derive(Args, Debug)]
pub struct HealthCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl HealthCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let engine = super::build_engine(config)?;
        engine.build_index().await?;
        let report = engine.health().await;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        println!("Chunks:     {}", report.chunk_count);
        println!(
            "Indexes:    {}",
            if report.index_kinds.is_empty() {
                "none".to_string()
            } else {
                report.index_kinds.join(", ")
            }
        );
        println!("Generation: {}", report.generation);

        Ok(())
    }
}
