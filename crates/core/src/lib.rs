//! Docent Core Library
//!
//! This crate provides the foundational utilities shared by every docent crate:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (RAG tunables, model settings, paths)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, EmbeddingSettings, LlmSettings, RagSettings};
pub use error::{AppError, AppResult};
