//! Shared fixtures: a workspace on disk, an offline embedder and a local
//! stand-in for the language model.

use crate::embeddings::providers::HashedProvider;
use crate::embeddings::Embedder;
use crate::session::RagSession;
use docent_core::{AppConfig, AppError, AppResult};
use docent_llm::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use docent_prompt::{PromptDefinition, UNKNOWN_ANSWER};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Answers only from the prompt's context section.
///
/// Each rule maps a phrase to a reply; the first phrase found in the
/// context wins. Without a match the model says it does not know.
pub struct GroundedFakeLlm {
    rules: Vec<(String, String)>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl GroundedFakeLlm {
    pub fn new(rules: &[(&str, &str)]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|(needle, reply)| (needle.to_string(), reply.to_string()))
                .collect(),
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            rules: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }
}

fn context_section(prompt: &str) -> &str {
    let start = prompt.find("Context:\n").map(|i| i + "Context:\n".len());
    let end = prompt.find("\nQuestion:");
    match (start, end) {
        (Some(start), Some(end)) if start <= end => &prompt[start..end],
        _ => "",
    }
}

#[async_trait::async_trait]
impl LlmClient for GroundedFakeLlm {
    fn provider_name(&self) -> &str {
        "grounded-fake"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(AppError::Llm("model process exited".to_string()));
        }

        let context = context_section(&request.prompt);
        let reply = self
            .rules
            .iter()
            .find(|(needle, _)| context.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| format!(" {}.\n", UNKNOWN_ANSWER));

        Ok(LlmResponse {
            content: reply,
            model: request.model.clone(),
            usage: LlmUsage::new(request.prompt.len() as u32 / 4, 8),
            done: true,
        })
    }
}

/// A temporary workspace with a `.docent` layout.
pub struct Workspace {
    _temp: TempDir,
    pub config: AppConfig,
}

impl Workspace {
    /// Workspace with chunk size 20 and overlap 5.
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let mut config = AppConfig {
            workspace: temp.path().to_path_buf(),
            ..Default::default()
        };
        config.rag.chunk_size = 20;
        config.rag.chunk_overlap = 5;
        config.rag.top_k = 4;

        Self {
            _temp: temp,
            config,
        }
    }

    pub fn documents_dir(&self) -> PathBuf {
        self.config.documents_dir()
    }

    /// Replace the documents directory with the given files.
    pub fn set_documents(&self, files: &[(&str, &str)]) {
        let dir = self.documents_dir();
        if dir.exists() {
            fs::remove_dir_all(&dir).unwrap();
        }
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
    }

    pub fn index_files(&self) -> (Vec<u8>, Vec<u8>) {
        let dir = self.config.index_dir();
        (
            read(&dir.join(crate::index::INDEX_FILE)),
            read(&dir.join(crate::index::CHUNKS_FILE)),
        )
    }

    /// Open a session with the hashed embedder and `llm`.
    pub async fn session(&self, llm: Arc<dyn LlmClient>) -> RagSession {
        self.session_with_dimension(llm, 384).await
    }

    pub async fn session_with_dimension(
        &self,
        llm: Arc<dyn LlmClient>,
        dimensions: usize,
    ) -> RagSession {
        RagSession::with_components(
            self.config.clone(),
            hashed_embedder(dimensions).await,
            llm,
            PromptDefinition::grounded_default(),
        )
        .unwrap()
    }
}

pub async fn hashed_embedder(dimensions: usize) -> Embedder {
    let provider = Arc::new(HashedProvider::new(dimensions, "hashed-ngram-v1").unwrap());
    Embedder::from_provider(provider, 64).await.unwrap()
}

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}
