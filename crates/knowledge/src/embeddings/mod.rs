//! Embedding adapter for the knowledge pipeline.
//!
//! [`Embedder`] wraps a provider behind a stable batch interface. It is
//! loaded once per process; loading embeds a probe text so a broken model
//! fails immediately and the vector dimension is learned from real output.

pub mod provider;
pub mod providers;

pub use provider::{create_provider, EmbeddingProvider};

use crate::progress::ProgressReporter;
use docent_core::{AppError, AppResult, EmbeddingSettings};
use std::sync::Arc;

const PROBE_TEXT: &str = "docent embedding probe";

/// Long-lived handle to the embedding model.
#[derive(Debug, Clone)]
pub struct Embedder {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
    dimension: usize,
}

impl Embedder {
    /// Build the configured provider and verify it produces vectors.
    ///
    /// # Errors
    /// Returns a configuration error for unknown or non-local providers and
    /// an embedding error if the model cannot produce a probe vector.
    pub async fn load(settings: &EmbeddingSettings) -> AppResult<Self> {
        let provider = create_provider(settings)?;
        Self::from_provider(provider, settings.batch_size).await
    }

    /// Wrap an existing provider, discovering its dimension.
    pub async fn from_provider(
        provider: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
    ) -> AppResult<Self> {
        if batch_size == 0 {
            return Err(AppError::Config(
                "Embedding batch size must be greater than 0".to_string(),
            ));
        }

        let probe = provider.embed(PROBE_TEXT).await.map_err(|e| {
            AppError::Embedding(format!(
                "Failed to load embedding model '{}' ({}): {}",
                provider.model_name(),
                provider.provider_name(),
                e
            ))
        })?;

        if probe.is_empty() {
            return Err(AppError::Embedding(format!(
                "Embedding model '{}' produced an empty vector",
                provider.model_name()
            )));
        }

        tracing::info!(
            provider = provider.provider_name(),
            model = provider.model_name(),
            dimension = probe.len(),
            "Loaded embedding model"
        );

        Ok(Self {
            dimension: probe.len(),
            provider,
            batch_size,
        })
    }

    /// Vector dimension discovered at load time.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    /// Embed texts in order, `batch_size` at a time.
    ///
    /// Every returned vector has [`dimension`](Self::dimension) components.
    pub async fn embed_texts(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        self.embed_texts_with_progress(texts, &ProgressReporter::noop()).await
    }

    /// Like [`embed_texts`](Self::embed_texts), reporting an embed event
    /// after every batch.
    pub async fn embed_texts_with_progress(
        &self,
        texts: &[String],
        progress: &ProgressReporter,
    ) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let vectors = self.provider.embed_batch(batch).await?;

            if vectors.len() != batch.len() {
                return Err(AppError::Embedding(format!(
                    "Embedding model returned {} vectors for {} texts",
                    vectors.len(),
                    batch.len()
                )));
            }

            for vector in &vectors {
                self.check_dimension(vector)?;
            }

            embeddings.extend(vectors);
            tracing::debug!("Embedded {}/{} texts", embeddings.len(), texts.len());
            progress.embed(embeddings.len() as u64, texts.len() as u64, self.model_name());
        }

        Ok(embeddings)
    }

    /// Embed a single query text.
    pub async fn embed_query(&self, query: &str) -> AppResult<Vec<f32>> {
        let vector = self.provider.embed(query).await?;
        self.check_dimension(&vector)?;
        Ok(vector)
    }

    fn check_dimension(&self, vector: &[f32]) -> AppResult<()> {
        if vector.len() != self.dimension {
            return Err(AppError::Embedding(format!(
                "Embedding dimension changed: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{IngestPhase, ProgressEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider that records batch sizes and can drift its dimension.
    #[derive(Debug, Default)]
    struct RecordingProvider {
        calls: AtomicUsize,
        largest_batch: AtomicUsize,
        drift_after: Option<usize>,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for RecordingProvider {
        fn provider_name(&self) -> &str {
            "recording"
        }

        fn model_name(&self) -> &str {
            "recording-v1"
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.largest_batch.fetch_max(texts.len(), Ordering::SeqCst);

            let dimension = match self.drift_after {
                Some(n) if call >= n => 4,
                _ => 3,
            };

            Ok(texts
                .iter()
                .map(|t| vec![t.len() as f32; dimension])
                .collect())
        }
    }

    #[tokio::test]
    async fn test_load_discovers_dimension() {
        let embedder = Embedder::load(&EmbeddingSettings {
            dimensions: 64,
            ..Default::default()
        })
        .await
        .unwrap();

        assert_eq!(embedder.dimension(), 64);
        assert_eq!(embedder.provider_name(), "hashed");
    }

    #[tokio::test]
    async fn test_embed_texts_batches_in_order() {
        let provider = Arc::new(RecordingProvider::default());
        let embedder = Embedder::from_provider(provider.clone(), 2).await.unwrap();
        assert_eq!(embedder.dimension(), 3);

        let texts: Vec<String> = ["a", "bb", "ccc", "dddd", "eeeee"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let vectors = embedder.embed_texts(&texts).await.unwrap();

        let firsts: Vec<f32> = vectors.iter().map(|v| v[0]).collect();
        assert_eq!(firsts, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(provider.largest_batch.load(Ordering::SeqCst), 2);
        // probe + three batches
        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_embed_reports_each_batch() {
        let provider = Arc::new(RecordingProvider::default());
        let embedder = Embedder::from_provider(provider, 2).await.unwrap();
        let texts: Vec<String> = (0..5).map(|i| format!("text {}", i)).collect();

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let progress = ProgressReporter::new(Arc::new(move |event: ProgressEvent| {
            sink.lock().unwrap().push(event);
        }));

        embedder
            .embed_texts_with_progress(&texts, &progress)
            .await
            .unwrap();

        let events = events.lock().unwrap();
        let counts: Vec<u64> = events.iter().map(|e| e.current).collect();
        assert_eq!(counts, vec![2, 4, 5]);
        assert!(events
            .iter()
            .all(|e| e.phase == IngestPhase::Embed && e.total == Some(5)));
    }

    #[tokio::test]
    async fn test_dimension_drift_is_rejected() {
        let provider = Arc::new(RecordingProvider {
            drift_after: Some(1),
            ..Default::default()
        });
        let embedder = Embedder::from_provider(provider, 8).await.unwrap();

        let result = embedder.embed_query("query").await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }

    #[tokio::test]
    async fn test_zero_batch_size_rejected() {
        let provider = Arc::new(RecordingProvider::default());
        let result = Embedder::from_provider(provider, 0).await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[tokio::test]
    async fn test_load_failure_is_embedding_error() {
        let settings = EmbeddingSettings {
            provider: "ollama".to_string(),
            endpoint: "http://127.0.0.1:9".to_string(),
            timeout_secs: 2,
            ..Default::default()
        };

        let result = Embedder::load(&settings).await;
        assert!(matches!(result, Err(AppError::Embedding(_))));
    }
}
