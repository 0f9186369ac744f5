//! Offline retrieval-augmented answering over a local document collection.
//!
//! The pipeline, leaves first:
//! - [`chunker`]: fixed-size overlapping character windows
//! - [`embeddings`]: the [`Embedder`] adapter over a local embedding model
//! - [`vector_index`] and [`index`]: exact L2 search and the persisted
//!   index / chunk file pair
//! - [`ingest`]: load, chunk, embed, build, persist
//! - [`rag`]: retrieval and grounded answer generation
//!
//! [`RagSession`] ties them together for the CLI.
//!
//! # Example
//! ```no_run
//! use docent_core::AppConfig;
//! use docent_knowledge::RagSession;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AppConfig::load(None, None)?;
//! let mut session = RagSession::open(config).await?;
//!
//! session.ingest_documents().await?;
//! let answer = session.generate_answer("What color is the sky?").await?;
//! println!("{}", answer.text);
//! # Ok(())
//! # }
//! ```

pub mod chunker;
pub mod embeddings;
pub mod index;
pub mod ingest;
pub mod loader;
pub mod progress;
pub mod rag;
pub mod session;
pub mod types;
pub mod vector_index;

#[cfg(test)]
mod tests;

pub use chunker::Chunker;
pub use embeddings::{create_provider, Embedder, EmbeddingProvider};
pub use index::{IndexStore, LoadedIndex};
pub use progress::{IngestPhase, ProgressEvent, ProgressReporter};
pub use rag::{
    Answer, AnswerGenerator, ChatHistory, ChatTurn, RetrievalResult, RetrievedChunk, Retriever,
};
pub use session::RagSession;
pub use types::{Chunk, Document, IndexStats, IngestStats};
pub use vector_index::{FlatL2Index, Neighbor};

pub use docent_prompt::UNKNOWN_ANSWER;
