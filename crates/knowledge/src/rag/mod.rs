//! Retrieval-augmented answering.
//!
//! The [`Retriever`] finds the chunks nearest to a query and the
//! [`AnswerGenerator`] turns them into a grounded prompt for the language
//! model.

pub mod answer;
pub mod retriever;
pub mod types;

pub use answer::{AnswerGenerator, CONTEXT_SEPARATOR};
pub use retriever::Retriever;
pub use types::{Answer, ChatHistory, ChatTurn, RetrievalResult, RetrievedChunk};
