//! Language model integration for docent.
//!
//! This crate wraps a locally hosted language model behind the
//! [`LlmClient`] trait: one prompt in, one completion out. Clients keep no
//! conversation state between calls.
//!
//! # Providers
//! - **Ollama**: local model runtime (default)
//! - **llama.cpp**: `llama-server` serving a GGUF model file
//!
//! # Example
//! ```no_run
//! use docent_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "orca-mini:3b").with_max_tokens(300);
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{LlamaCppClient, OllamaClient};
