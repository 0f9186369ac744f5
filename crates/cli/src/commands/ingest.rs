//! Ingest command handler.

use clap::Args;
use docent_core::{config::AppConfig, AppResult};
use docent_knowledge::{ProgressEvent, ProgressReporter, RagSession};
use std::sync::Arc;

/// Rebuild the knowledge base
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let mut session = RagSession::open(config).await?;
        if !self.json {
            let print = |event: ProgressEvent| eprintln!("{}", event.format_simple());
            session = session.with_progress(ProgressReporter::new(Arc::new(print)));
        }

        let stats = session.ingest_documents().await?;

        if self.json {
            println!("{}", super::to_json(&stats)?);
        } else {
            println!(
                "Ingested {} documents into {} chunks (dimension {}) in {:.2}s",
                stats.documents, stats.chunks, stats.dimension, stats.duration_secs
            );
        }

        Ok(())
    }
}
