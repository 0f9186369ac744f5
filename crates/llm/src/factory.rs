//! LLM provider factory.
//!
//! Resolves the configured provider into a long-lived client. The client is
//! created once per process by the composition root and shared by reference.

use crate::client::LlmClient;
use crate::providers::{LlamaCppClient, OllamaClient};
use docent_core::{AppError, AppResult, LlmSettings};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client from settings.
///
/// # Errors
/// Returns a configuration error if:
/// - Provider is unknown
/// - The endpoint is not a loopback address
pub fn create_client(settings: &LlmSettings) -> AppResult<Arc<dyn LlmClient>> {
    let timeout = Duration::from_secs(settings.timeout_secs);

    let client: Arc<dyn LlmClient> = match settings.provider.to_lowercase().as_str() {
        "ollama" => Arc::new(OllamaClient::with_base_url(&settings.endpoint, timeout)?),
        "llama-cpp" | "llamacpp" => Arc::new(LlamaCppClient::new(&settings.endpoint, timeout)?),
        _ => {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}",
                settings.provider
            )))
        }
    };

    tracing::debug!(
        provider = client.provider_name(),
        model = %settings.model,
        endpoint = %settings.endpoint,
        "Created LLM client"
    );

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client(&LlmSettings::default()).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_llama_cpp_client() {
        let settings = LlmSettings {
            provider: "llama-cpp".to_string(),
            endpoint: "http://localhost:8080".to_string(),
            ..Default::default()
        };
        let client = create_client(&settings).unwrap();
        assert_eq!(client.provider_name(), "llama-cpp");
    }

    #[test]
    fn test_unknown_provider() {
        let settings = LlmSettings {
            provider: "openai".to_string(),
            ..Default::default()
        };
        match create_client(&settings) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown LLM provider")),
            _ => panic!("Expected config error for unknown provider"),
        }
    }

    #[test]
    fn test_remote_endpoint_rejected() {
        let settings = LlmSettings {
            endpoint: "http://203.0.113.9:11434".to_string(),
            ..Default::default()
        };
        assert!(create_client(&settings).is_err());
    }
}
