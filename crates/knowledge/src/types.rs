//! Core types for the knowledge pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw text of one source document (or one PDF page).
///
/// Documents are produced by the loader and consumed immediately by the
/// chunker; they are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// File name, plus `#page=N` for PDF pages
    pub source: String,

    /// Extracted text
    pub text: String,
}

impl Document {
    /// Create a document from a source name and its text.
    pub fn new(source: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            text: text.into(),
        }
    }
}

/// A window of document text, the unit of embedding and retrieval.
///
/// A chunk keeps no link to its document; its position in the index is the
/// only association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Character offset of the window within its document
    pub start: usize,

    /// Untrimmed window text
    pub text: String,
}

/// Statistics from an ingestion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestStats {
    /// Documents (or PDF pages) that yielded text
    pub documents: usize,

    /// Chunks embedded and indexed
    pub chunks: usize,

    /// Embedding dimension of the new index
    pub dimension: usize,

    /// Wall-clock duration of the run
    pub duration_secs: f64,
}

/// Statistics about the persisted index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of indexed chunks
    pub chunks: usize,

    /// Embedding dimension
    pub dimension: usize,

    /// Size of the index file in bytes
    pub index_bytes: u64,

    /// Size of the chunk file in bytes
    pub chunks_bytes: u64,

    /// Last modification time of the index file
    pub built_at: Option<DateTime<Utc>>,
}
