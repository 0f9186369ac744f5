//! Command handlers for the docent CLI.

pub mod add;
pub mod ask;
pub mod chat;
pub mod ingest;
pub mod stats;

pub use add::AddCommand;
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use ingest::IngestCommand;
pub use stats::StatsCommand;

use docent_core::{AppError, AppResult};
use serde::Serialize;

/// Render `value` as pretty JSON.
pub(crate) fn to_json<T: Serialize>(value: &T) -> AppResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Serialization(format!("JSON serialization failed: {}", e)))
}
