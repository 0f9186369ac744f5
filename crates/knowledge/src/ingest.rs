//! Ingestion pipeline: load, chunk, embed, build, persist.
//!
//! A run either replaces the persisted index pair completely or leaves it
//! untouched. Every check that can fail (empty input, embedding errors,
//! index construction) happens before the first byte is written.

use crate::chunker::Chunker;
use crate::embeddings::Embedder;
use crate::index::IndexStore;
use crate::loader;
use crate::progress::ProgressReporter;
use crate::types::{Document, IngestStats};
use crate::vector_index::FlatL2Index;
use docent_core::{AppConfig, AppError, AppResult};
use std::path::Path;
use std::time::Instant;

/// Rebuild the knowledge base from the configured documents directory.
///
/// # Errors
/// * `AppError::EmptyInput` - If the documents yield no chunks; the previous
///   index is left as it was
/// * `AppError::Embedding` - If embedding fails; nothing is written
pub async fn ingest_documents(
    config: &AppConfig,
    embedder: &Embedder,
    progress: &ProgressReporter,
) -> AppResult<IngestStats> {
    let chunker = Chunker::from_settings(&config.rag)?;
    let store = IndexStore::new(config.index_dir());

    ingest_from_dir(&config.documents_dir(), &chunker, embedder, &store, progress).await
}

/// Rebuild the index in `store` from the documents under `documents_dir`.
pub async fn ingest_from_dir(
    documents_dir: &Path,
    chunker: &Chunker,
    embedder: &Embedder,
    store: &IndexStore,
    progress: &ProgressReporter,
) -> AppResult<IngestStats> {
    let start = Instant::now();

    tracing::info!("Starting ingestion from {:?}", documents_dir);

    let documents = loader::load_documents(documents_dir)?;
    progress.load(documents.len() as u64, &documents_dir.display().to_string());
    tracing::info!("Loaded {} documents", documents.len());

    let (index, chunks) = build_index(&documents, chunker, embedder, progress).await?;

    store.save(&index, &chunks)?;
    progress.persist(&store.dir().display().to_string());

    let duration = start.elapsed();

    tracing::info!(
        "Ingestion completed: {} documents, {} chunks, dimension {} in {:.2}s",
        documents.len(),
        chunks.len(),
        index.dimension(),
        duration.as_secs_f64()
    );

    Ok(IngestStats {
        documents: documents.len(),
        chunks: chunks.len(),
        dimension: index.dimension(),
        duration_secs: duration.as_secs_f64(),
    })
}

/// Chunk and embed documents into an index and its parallel chunk texts.
///
/// Touches no files.
pub async fn build_index(
    documents: &[Document],
    chunker: &Chunker,
    embedder: &Embedder,
    progress: &ProgressReporter,
) -> AppResult<(FlatL2Index, Vec<String>)> {
    let chunks: Vec<String> = chunker
        .chunk_documents(documents)
        .into_iter()
        .map(|c| c.text)
        .collect();
    progress.chunk(chunks.len() as u64, documents.len() as u64);
    tracing::info!(
        "Chunked {} documents into {} chunks (size {}, overlap {})",
        documents.len(),
        chunks.len(),
        chunker.chunk_size(),
        chunker.chunk_overlap()
    );

    if chunks.is_empty() {
        return Err(AppError::EmptyInput(format!(
            "{} document(s) produced no text chunks. Add PDF or text files with extractable text.",
            documents.len()
        )));
    }

    let embed_start = Instant::now();
    progress.embed(0, chunks.len() as u64, embedder.model_name());
    let vectors = embedder.embed_texts_with_progress(&chunks, progress).await?;
    tracing::info!(
        "Embedded {} chunks with {} in {:.2}s",
        vectors.len(),
        embedder.model_name(),
        embed_start.elapsed().as_secs_f64()
    );

    let index = FlatL2Index::build(vectors)?;
    progress.build(index.len() as u64, index.dimension());

    Ok((index, chunks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::HashedProvider;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    async fn embedder() -> Embedder {
        let provider = Arc::new(HashedProvider::new(128, "hashed-ngram-v1").unwrap());
        Embedder::from_provider(provider, 4).await.unwrap()
    }

    #[tokio::test]
    async fn test_build_index_flattens_documents() {
        let documents = vec![
            Document::new("a.txt", "The sky is blue. Grass is green."),
            Document::new("b.txt", "Water is wet."),
        ];
        let chunker = Chunker::new(20, 5).unwrap();

        let embedder = embedder().await;
        let progress = ProgressReporter::noop();

        let (index, chunks) = build_index(&documents, &chunker, &embedder, &progress)
            .await
            .unwrap();

        assert_eq!(
            chunks,
            vec!["The sky is blue. Gra", ". Grass is green.", "n.", "Water is wet."]
        );
        assert_eq!(index.len(), chunks.len());
        assert_eq!(index.dimension(), 128);
    }

    #[tokio::test]
    async fn test_ingest_from_dir_writes_pair() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("documents");
        fs::create_dir_all(&docs).unwrap();
        fs::write(docs.join("notes.txt"), "The sky is blue. Grass is green.").unwrap();

        let store = IndexStore::new(temp.path().join("index"));
        let stats = ingest_from_dir(
            &docs,
            &Chunker::new(20, 5).unwrap(),
            &embedder().await,
            &store,
            &ProgressReporter::noop(),
        )
        .await
        .unwrap();

        assert_eq!(stats.documents, 1);
        assert_eq!(stats.chunks, 3);
        assert_eq!(stats.dimension, 128);
        assert_eq!(store.load().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_blank_documents_are_empty_input() {
        let documents = vec![Document::new("blank.txt", " \n\t ")];
        let chunker = Chunker::new(20, 5).unwrap();

        let embedder = embedder().await;

        let result = build_index(&documents, &chunker, &embedder, &ProgressReporter::noop()).await;
        assert!(matches!(result, Err(AppError::EmptyInput(_))));
    }
}
