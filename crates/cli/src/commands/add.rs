//! Add command handler.

use clap::Args;
use docent_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

/// Copy documents into the documents directory
#[derive(Args, Debug)]
pub struct AddCommand {
    /// PDF, text, Markdown or HTML files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

impl AddCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let dir = config.documents_dir();
        tracing::info!("Adding {} file(s) to {:?}", self.files.len(), dir);

        let added = docent_knowledge::loader::add_documents(&self.files, &dir)?;

        for path in &added {
            println!("Added {}", path.display());
        }
        println!("Run `docent ingest` to rebuild the knowledge base.");

        Ok(())
    }
}
