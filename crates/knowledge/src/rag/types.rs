//! Retrieval and answer types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chunk returned by retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Position of the chunk in the index
    pub position: usize,

    /// Chunk text
    pub text: String,

    /// Squared L2 distance to the query (smaller is closer)
    pub distance: f32,
}

/// Chunks retrieved for one query, nearest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    pub hits: Vec<RetrievedChunk>,
}

impl RetrievalResult {
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Chunk texts in retrieval order.
    pub fn texts(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.text.as_str()).collect()
    }
}

/// A generated answer and the chunks it was grounded on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Trimmed model output
    pub text: String,

    /// Chunks placed in the prompt, in retrieval order
    pub used_chunks: Vec<RetrievedChunk>,

    /// Phrase the model was told to use when the context is insufficient
    #[serde(skip)]
    pub unknown_answer: String,
}

impl Answer {
    /// Whether the model answered with the "unknown" phrase.
    ///
    /// Matching ignores case, typographic apostrophes and trailing
    /// punctuation, and accepts the phrase as a prefix ("I don't know the
    /// answer.").
    pub fn is_unknown(&self) -> bool {
        let sentinel = normalize(&self.unknown_answer);
        !sentinel.is_empty() && normalize(&self.text).starts_with(&sentinel)
    }
}

fn normalize(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation())
        .replace('\u{2019}', "'")
        .to_lowercase()
}

/// One question and its answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub query: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

/// In-memory log of a session's exchanges.
///
/// The history is for display only; it is never sent to the model and
/// never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an exchange.
    pub fn push(&mut self, query: impl Into<String>, answer: impl Into<String>) {
        self.turns.push(ChatTurn {
            query: query.into(),
            answer: answer.into(),
            asked_at: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
