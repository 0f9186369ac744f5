use super::support::{GroundedFakeLlm, Workspace};
use docent_core::AppError;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const SKY: &str = "The sky is blue. Grass is green.";

fn sky_llm() -> Arc<GroundedFakeLlm> {
    Arc::new(GroundedFakeLlm::new(&[("sky is blue", "The sky is blue.")]))
}

#[tokio::test]
async fn test_ingest_then_answer_from_context() {
    let workspace = Workspace::new();
    workspace.set_documents(&[("nature.txt", SKY), ("water.md", "# Water\n\nWater is wet.")]);
    let mut session = workspace.session(sky_llm()).await;

    let stats = session.ingest_documents().await.unwrap();
    assert_eq!(stats.documents, 2);
    assert!(stats.chunks >= 2);
    assert_eq!(stats.dimension, 384);

    let retrieval = session.retrieve("What color is the sky?").await.unwrap();
    assert!(retrieval.hits[0].text.contains("sky is blue"));

    let answer = session.generate_answer("What color is the sky?").await.unwrap();
    assert_eq!(answer.text, "The sky is blue.");
    assert!(!answer.is_unknown());
    assert!(!answer.used_chunks.is_empty());

    assert_eq!(session.history().len(), 1);
    assert_eq!(session.history().turns()[0].query, "What color is the sky?");
}

#[tokio::test]
async fn test_query_without_index_is_config_error() {
    let workspace = Workspace::new();
    let llm = sky_llm();
    let mut session = workspace.session(llm.clone()).await;

    let result = session.generate_answer("What color is the sky?").await;

    assert!(matches!(result, Err(AppError::Config(_))));
    assert!(session.history().is_empty());
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_absent_answer_is_unknown() {
    let workspace = Workspace::new();
    workspace.set_documents(&[("nature.txt", SKY)]);
    let llm = Arc::new(GroundedFakeLlm::new(&[("Paris", "The capital is Paris.")]));
    let mut session = workspace.session(llm).await;
    session.ingest_documents().await.unwrap();

    let answer = session
        .generate_answer("What is the capital of France?")
        .await
        .unwrap();

    assert!(answer.is_unknown());
    assert_eq!(answer.text, "I don't know.");
}

#[tokio::test]
async fn test_failed_ingest_keeps_previous_index() {
    let workspace = Workspace::new();
    workspace.set_documents(&[("nature.txt", SKY)]);
    let mut session = workspace.session(sky_llm()).await;
    session.ingest_documents().await.unwrap();
    let before = workspace.index_files();

    workspace.set_documents(&[("blank.txt", "  \n\t\n")]);
    let result = session.ingest_documents().await;

    assert!(matches!(result, Err(AppError::EmptyInput(_))));
    assert_eq!(workspace.index_files(), before);

    let answer = session.generate_answer("What color is the sky?").await.unwrap();
    assert_eq!(answer.text, "The sky is blue.");
}

#[tokio::test]
async fn test_reingest_replaces_cached_index() {
    let workspace = Workspace::new();
    workspace.set_documents(&[("nature.txt", SKY)]);
    let mut session = workspace.session(sky_llm()).await;
    session.ingest_documents().await.unwrap();

    session.retrieve("What color is the sky?").await.unwrap();
    assert!(session.is_index_cached());

    workspace.set_documents(&[("rust.txt", "Rust is a programming language.")]);
    session.ingest_documents().await.unwrap();
    assert!(!session.is_index_cached());

    let retrieval = session
        .retrieve("Which programming language is Rust?")
        .await
        .unwrap();

    assert_eq!(retrieval.len(), 3);
    assert!(retrieval.texts().iter().all(|text| !text.contains("sky")));
    assert!(retrieval.hits[0].text.contains("Rust"));
}

#[tokio::test]
async fn test_llm_failure_leaves_state_usable() {
    let workspace = Workspace::new();
    workspace.set_documents(&[("nature.txt", SKY)]);
    let mut session = workspace.session(Arc::new(GroundedFakeLlm::failing())).await;
    session.ingest_documents().await.unwrap();
    let before = workspace.index_files();

    let result = session.generate_answer("What color is the sky?").await;

    assert!(matches!(result, Err(AppError::Llm(_))));
    assert!(session.history().is_empty());
    assert_eq!(workspace.index_files(), before);
    assert!(!session.retrieve("sky").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_embedding_dimension_change_is_index_error() {
    let workspace = Workspace::new();
    workspace.set_documents(&[("nature.txt", SKY)]);
    let mut session = workspace.session(sky_llm()).await;
    session.ingest_documents().await.unwrap();

    let mut reopened = workspace.session_with_dimension(sky_llm(), 128).await;
    let result = reopened.retrieve("What color is the sky?").await;

    assert!(matches!(result, Err(AppError::Index(_))));
}

#[tokio::test]
async fn test_stats_describe_persisted_pair() {
    let workspace = Workspace::new();
    workspace.set_documents(&[("nature.txt", SKY)]);
    let mut session = workspace.session(sky_llm()).await;
    session.ingest_documents().await.unwrap();

    let stats = session.stats().unwrap();

    assert_eq!(stats.chunks, 3);
    assert_eq!(stats.dimension, 384);
    assert!(stats.index_bytes > 0);
    assert!(stats.built_at.is_some());
}

#[tokio::test]
async fn test_reload_index_picks_up_another_sessions_ingest() {
    let workspace = Workspace::new();
    workspace.set_documents(&[("nature.txt", SKY)]);
    let mut writer = workspace.session(sky_llm()).await;
    writer.ingest_documents().await.unwrap();

    let mut reader = workspace.session(sky_llm()).await;
    let before = reader.retrieve("sky").await.unwrap();
    assert!(before.texts().iter().any(|text| text.contains("sky")));

    workspace.set_documents(&[("rust.txt", "Rust is a programming language.")]);
    writer.ingest_documents().await.unwrap();

    let cached = reader.retrieve("sky").await.unwrap();
    assert_eq!(cached, before);

    reader.reload_index().unwrap();
    assert!(reader.is_index_cached());

    let reloaded = reader.retrieve("Rust").await.unwrap();
    assert!(reloaded.texts().iter().all(|text| !text.contains("sky")));
    assert!(reloaded.hits[0].text.contains("Rust"));
}

#[tokio::test]
async fn test_reload_index_without_pair_is_config_error() {
    let workspace = Workspace::new();
    let mut session = workspace.session(sky_llm()).await;

    assert!(matches!(session.reload_index(), Err(AppError::Config(_))));
    assert!(!session.is_index_cached());
}
