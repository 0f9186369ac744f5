//! Error types for docent.
//!
//! This module defines a unified error enum covering every failure category
//! of the retrieval-augmented answering pipeline: configuration, empty
//! ingestion input, model invocation, index integrity, prompts and I/O.

use thiserror::Error;

/// Unified error type for docent.
///
/// All functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors are represented and propagated to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors: invalid tunables, unknown providers, missing
    /// model files or a knowledge base that was never ingested.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ingestion produced no usable chunks.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Embedding model load or invocation errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Language model invocation errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Vector index integrity errors
    #[error("Index error: {0}")]
    Index(String),

    /// Prompt template errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
