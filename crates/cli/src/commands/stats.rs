//! Stats command handler.

use clap::Args;
use docent_core::{config::AppConfig, AppResult};
use docent_knowledge::IndexStore;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let store = IndexStore::new(config.index_dir());
        let stats = store.stats()?;

        if self.json {
            println!("{}", super::to_json(&stats)?);
        } else {
            println!("Knowledge base: {}", store.dir().display());
            println!("  Chunks: {}", stats.chunks);
            println!("  Dimension: {}", stats.dimension);
            println!("  Index size: {} bytes", stats.index_bytes);
            println!("  Chunk file size: {} bytes", stats.chunks_bytes);
            if let Some(built_at) = stats.built_at {
                println!("  Built: {}", built_at.to_rfc3339());
            }
        }

        Ok(())
    }
}
