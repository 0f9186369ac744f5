//! Process-level composition root.
//!
//! [`RagSession`] owns the long-lived handles (embedding model, language
//! model client, prompt) and the in-memory index cache. Every entry point
//! takes `&mut self`, so ingestion and querying can never overlap within a
//! session.

use crate::embeddings::Embedder;
use crate::index::{IndexStore, LoadedIndex};
use crate::ingest;
use crate::progress::ProgressReporter;
use crate::rag::{Answer, AnswerGenerator, ChatHistory, RetrievalResult, Retriever};
use crate::types::{IndexStats, IngestStats};
use docent_core::{AppConfig, AppError, AppResult};
use docent_llm::{create_client, LlmClient};
use docent_prompt::{load_answer_prompt, PromptDefinition};
use std::sync::Arc;

/// A question-answering session over one workspace's knowledge base.
pub struct RagSession {
    config: AppConfig,
    embedder: Embedder,
    llm: Arc<dyn LlmClient>,
    retriever: Retriever,
    generator: AnswerGenerator,
    store: IndexStore,
    cached_index: Option<LoadedIndex>,
    history: ChatHistory,
    progress: ProgressReporter,
}

impl RagSession {
    /// Load the embedding model, language model client and prompt.
    ///
    /// The persisted index is not touched until the first query.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let embedder = Embedder::load(&config.embedding).await?;
        let llm = create_client(&config.llm)?;
        let prompt = load_answer_prompt(&config.prompts_dir())?;

        Self::with_components(config, embedder, llm, prompt)
    }

    /// Assemble a session from already-constructed handles.
    pub fn with_components(
        config: AppConfig,
        embedder: Embedder,
        llm: Arc<dyn LlmClient>,
        prompt: PromptDefinition,
    ) -> AppResult<Self> {
        let retriever = Retriever::new(config.rag.top_k)?;
        let generator = AnswerGenerator::with_prompt(&config, prompt);
        let store = IndexStore::new(config.index_dir());

        Ok(Self {
            config,
            embedder,
            llm,
            retriever,
            generator,
            store,
            cached_index: None,
            history: ChatHistory::new(),
            progress: ProgressReporter::noop(),
        })
    }

    /// Report ingestion phases through `progress`.
    pub fn with_progress(mut self, progress: ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    /// Rebuild the knowledge base from the documents directory.
    ///
    /// The cached index is dropped whether or not the run succeeds, so the
    /// next query always reads what is on disk.
    pub async fn ingest_documents(&mut self) -> AppResult<IngestStats> {
        let result = ingest::ingest_documents(&self.config, &self.embedder, &self.progress).await;
        self.cached_index = None;
        result
    }

    /// Retrieve the chunks nearest to `query`.
    ///
    /// # Errors
    /// Returns a configuration error if no knowledge base has been ingested.
    pub async fn retrieve(&mut self, query: &str) -> AppResult<RetrievalResult> {
        let index = cached_index(&mut self.cached_index, &self.store)?;
        self.retriever.retrieve(&self.embedder, index, query).await
    }

    /// Answer `query` from the knowledge base and record the exchange.
    pub async fn generate_answer(&mut self, query: &str) -> AppResult<Answer> {
        let retrieval = self.retrieve(query).await?;
        let answer = self
            .generator
            .answer(self.llm.as_ref(), query, retrieval)
            .await?;

        self.history.push(query, answer.text.clone());
        Ok(answer)
    }

    /// Drop the cached index and load the persisted pair again.
    pub fn reload_index(&mut self) -> AppResult<()> {
        self.cached_index = None;
        self.cached_index = Some(self.store.load()?);
        Ok(())
    }

    /// Describe the persisted index.
    pub fn stats(&self) -> AppResult<IndexStats> {
        self.store.stats()
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn is_index_cached(&self) -> bool {
        self.cached_index.is_some()
    }
}

fn cached_index<'a>(
    cache: &'a mut Option<LoadedIndex>,
    store: &IndexStore,
) -> AppResult<&'a LoadedIndex> {
    if cache.is_none() {
        *cache = Some(store.load()?);
    }
    cache
        .as_ref()
        .ok_or_else(|| AppError::Index("Index cache is empty".to_string()))
}
