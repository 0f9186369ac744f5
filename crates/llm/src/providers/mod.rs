//! Local language model runtimes.

pub mod llama_cpp;
pub mod ollama;

pub use llama_cpp::LlamaCppClient;
pub use ollama::OllamaClient;

use docent_core::config::ensure_loopback;
use docent_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

/// HTTP client for a runtime on this machine; `base_url` is normalised
/// without a trailing slash.
pub(crate) fn loopback_client(
    runtime: &str,
    base_url: &str,
    timeout: Duration,
) -> AppResult<(String, reqwest::Client)> {
    ensure_loopback(base_url)?;

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            AppError::Llm(format!("Failed to create HTTP client for {}: {}", runtime, e))
        })?;

    Ok((base_url.trim_end_matches('/').to_string(), client))
}

/// POST `body` as JSON and decode the JSON reply. Transport failures, non-2xx
/// statuses and undecodable bodies are all `AppError::Llm`.
pub(crate) async fn post_json<B, R>(
    client: &reqwest::Client,
    runtime: &str,
    url: &str,
    body: &B,
) -> AppResult<R>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| AppError::Llm(format!("{} is unreachable at {}: {}", runtime, url, e)))?;

    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::Llm(format!("{} returned {}: {}", runtime, status, detail)));
    }

    response
        .json()
        .await
        .map_err(|e| AppError::Llm(format!("Unexpected {} response: {}", runtime, e)))
}
