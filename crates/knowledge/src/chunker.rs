//! Text chunking with configurable size and overlap.
//!
//! Windows are measured in characters (Unicode scalar values), so multi-byte
//! text is never split inside a character.

use crate::types::{Chunk, Document};
use docent_core::{AppError, AppResult, RagSettings};

/// Splits text into fixed-size overlapping windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    /// Create a chunker.
    ///
    /// # Errors
    /// Returns a configuration error unless `0 <= chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        if chunk_size == 0 {
            return Err(AppError::Config(
                "Chunk size must be greater than 0".to_string(),
            ));
        }

        if chunk_overlap >= chunk_size {
            return Err(AppError::Config(format!(
                "Chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }

        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Create a chunker from the configured RAG settings.
    pub fn from_settings(settings: &RagSettings) -> AppResult<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Distance between consecutive window starts.
    pub fn step(&self) -> usize {
        self.chunk_size - self.chunk_overlap
    }

    /// Chunk text into overlapping windows.
    ///
    /// The window `[start, start + chunk_size)` advances by [`step`](Self::step)
    /// from 0 until it passes the end of the text. A window is emitted only
    /// when it contains something other than whitespace; the emitted text is
    /// the untrimmed window.
    pub fn chunk_text(&self, text: &str) -> Vec<Chunk> {
        // Byte offset of every character, plus the end of the string
        let boundaries: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        let char_count = boundaries.len() - 1;

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < char_count {
            let end = (start + self.chunk_size).min(char_count);
            let window = &text[boundaries[start]..boundaries[end]];

            if !window.trim().is_empty() {
                chunks.push(Chunk {
                    start,
                    text: window.to_string(),
                });
            }

            start += self.step();
        }

        chunks
    }

    /// Chunk several documents into one flat sequence, in document order.
    pub fn chunk_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        documents
            .iter()
            .flat_map(|doc| {
                let chunks = self.chunk_text(&doc.text);
                tracing::debug!("Chunked {}: {} chunks", doc.source, chunks.len());
                chunks
            })
            .collect()
    }
}
