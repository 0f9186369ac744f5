//! Nearest-chunk retrieval for a query.

use crate::embeddings::Embedder;
use crate::index::LoadedIndex;
use crate::rag::types::{RetrievalResult, RetrievedChunk};
use docent_core::{AppError, AppResult};

/// Embeds queries and looks up their nearest chunks.
#[derive(Debug, Clone, Copy)]
pub struct Retriever {
    top_k: usize,
}

impl Retriever {
    /// Create a retriever returning at most `top_k` chunks per query.
    pub fn new(top_k: usize) -> AppResult<Self> {
        if top_k == 0 {
            return Err(AppError::Config("topK must be greater than 0".to_string()));
        }
        Ok(Self { top_k })
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Retrieve the chunks nearest to `query`, nearest first.
    ///
    /// # Errors
    /// * `AppError::Embedding` - If the query cannot be embedded
    /// * `AppError::Index` - If the query dimension does not match the index,
    ///   e.g. because the embedding model changed since ingestion
    pub async fn retrieve(
        &self,
        embedder: &Embedder,
        loaded: &LoadedIndex,
        query: &str,
    ) -> AppResult<RetrievalResult> {
        if loaded.is_empty() {
            return Err(AppError::Config(
                "Knowledge base is empty. Run `docent ingest` first.".to_string(),
            ));
        }

        let query_vector = embedder.embed_query(query).await?;

        if query_vector.len() != loaded.dimension() {
            return Err(AppError::Index(format!(
                "Query embedding has dimension {} but the index was built with {}. \
                 Re-run `docent ingest` after changing the embedding model.",
                query_vector.len(),
                loaded.dimension()
            )));
        }

        let neighbors = loaded.index.search(&query_vector, self.top_k)?;

        let hits = neighbors
            .into_iter()
            .map(|n| {
                let text = loaded.chunks.get(n.position).cloned().ok_or_else(|| {
                    AppError::Index(format!("Index position {} has no chunk text", n.position))
                })?;
                Ok(RetrievedChunk {
                    position: n.position,
                    text,
                    distance: n.distance,
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        tracing::debug!(
            "Retrieved {} chunks for query (nearest distance {:?})",
            hits.len(),
            hits.first().map(|h| h.distance)
        );

        Ok(RetrievalResult { hits })
    }
}
