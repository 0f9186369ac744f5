//! llama.cpp server provider.
//!
//! `llama-server` loads a single GGUF model file and exposes `/completion`.
//! The model is chosen when the server starts, so the request's model field
//! is only echoed back for attribution.

use super::{loopback_client, post_json};
use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docent_core::AppResult;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct CompletionRequest {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    n_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    content: String,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    tokens_evaluated: Option<u32>,
    #[serde(default)]
    tokens_predicted: Option<u32>,
    #[serde(default)]
    stopped_limit: bool,
}

/// Client for a local `llama-server` instance.
pub struct LlamaCppClient {
    base_url: String,
    client: reqwest::Client,
}

impl LlamaCppClient {
    /// Create a client for a loopback `llama-server` URL.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let (base_url, client) = loopback_client("llama.cpp server", &base_url.into(), timeout)?;
        Ok(Self { base_url, client })
    }

    fn to_completion_request(&self, request: &LlmRequest) -> CompletionRequest {
        // /completion has no system slot; the system text leads the prompt.
        let prompt = match &request.system {
            Some(system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        };

        CompletionRequest {
            prompt,
            n_predict: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        }
    }

    fn convert_response(&self, request: &LlmRequest, response: CompletionResponse) -> LlmResponse {
        LlmResponse {
            content: response.content,
            model: response.model.unwrap_or_else(|| request.model.clone()),
            usage: LlmUsage::new(
                response.tokens_evaluated.unwrap_or(0),
                response.tokens_predicted.unwrap_or(0),
            ),
            done: !response.stopped_limit,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for LlamaCppClient {
    fn provider_name(&self) -> &str {
        "llama-cpp"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Requesting completion from llama.cpp server");
        tracing::debug!("Request: {:?}", request);

        let url = format!("{}/completion", self.base_url);
        let reply: CompletionResponse = post_json(
            &self.client,
            "llama.cpp server",
            &url,
            &self.to_completion_request(request),
        )
        .await?;

        Ok(self.convert_response(request, reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LlamaCppClient {
        LlamaCppClient::new("http://127.0.0.1:8080", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_rejects_remote_url() {
        let result = LlamaCppClient::new("http://models.example.org", Duration::from_secs(5));
        assert!(result.is_err());
    }

    #[test]
    fn test_system_prompt_is_prepended() {
        let request = LlmRequest::new("Question?", "model.gguf")
            .with_system("Rules.")
            .with_max_tokens(64);

        let body = client().to_completion_request(&request);
        assert_eq!(body.prompt, "Rules.\n\nQuestion?");
        assert_eq!(body.n_predict, Some(64));
        assert!(!body.stream);
    }

    #[test]
    fn test_response_conversion() {
        let raw = serde_json::json!({
            "content": "I don't know",
            "tokens_evaluated": 12,
            "tokens_predicted": 4,
            "stopped_limit": false
        });
        let parsed: CompletionResponse = serde_json::from_value(raw).unwrap();
        let request = LlmRequest::new("q", "orca-mini-3b.gguf");

        let response = client().convert_response(&request, parsed);
        assert_eq!(response.content, "I don't know");
        assert_eq!(response.model, "orca-mini-3b.gguf");
        assert_eq!(response.usage.total_tokens, 16);
        assert!(response.done);
    }
}
