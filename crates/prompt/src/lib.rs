//! Prompt system for docent.
//!
//! This crate owns the grounded-answer prompt contract:
//! - A built-in definition that restricts the model to the supplied context
//! - Optional YAML overrides under `.docent/prompts/`
//! - Handlebars rendering of context and question into the final prompt

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{load_answer_prompt, load_prompt, ANSWER_PROMPT_ID};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, UNKNOWN_ANSWER};
