use std::{env, sync::Arc, sync::Once};

use careerlens::{
    config, embedding,
    jobs::{JobBoard, RapidApiJobBoard},
    llm::{ChatCompletionClient, CompletionClient, CompletionRequest},
    service::CareerService,
    usage::TokenUsageTracker,
};

static INIT: Once = Once::new();

fn set_default_env(key: &str, value: &str) {
    let needs_value = env::var(key).map(|v| v.trim().is_empty()).unwrap_or(true);
    if needs_value {
        // SAFETY: Tests run serially via Once and we intentionally mutate process env.
        unsafe {
            env::set_var(key, value);
        }
    }
}

fn init_config_once() {
    INIT.call_once(|| {
        set_default_env("CAREERLENS_DB_PATH", ":memory:");
        set_default_env("QDRANT_URL", "http://127.0.0.1:6333");
        set_default_env("QDRANT_COLLECTION_NAME", "careerlens-live");
        set_default_env("LLM_ENDPOINT", "https://api.openai.com");
        set_default_env("LLM_PROVIDER", "openai");
        config::init_config();
    });
}

#[tokio::test]
#[ignore = "Requires live Qdrant"]
async fn live_health_snapshot() {
    init_config_once();
    let service = CareerService::new()
        .await
        .expect("service should start against live Qdrant");
    let snapshot = service.health().await;
    assert!(snapshot.database_ok, "database should answer: {snapshot:?}");
    assert!(
        snapshot.qdrant_reachable,
        "Qdrant should be reachable: {snapshot:?}"
    );
    assert!(
        snapshot.collection_present,
        "job collection must exist after startup: {snapshot:?}"
    );
}

#[tokio::test]
#[ignore = "Requires live embedding credentials"]
async fn live_embedding_roundtrip() {
    init_config_once();
    let usage = Arc::new(TokenUsageTracker::new());
    let client = embedding::get_embedding_client(usage.clone()).expect("embedding client");
    let vectors = client
        .generate_embeddings(vec!["Senior data analyst, SQL and Tableau".to_string()])
        .await
        .expect("failed to request embeddings from provider");
    assert_eq!(vectors.len(), 1, "expected one embedding per input");
    let dimension = config::get_config().embedding_dimension;
    assert_eq!(vectors[0].len(), dimension, "embedding dimension mismatch");
}

#[tokio::test]
#[ignore = "Requires live LLM credentials"]
async fn live_chat_completion() {
    init_config_once();
    let usage = Arc::new(TokenUsageTracker::new());
    let client = ChatCompletionClient::from_config(config::get_config(), usage.clone())
        .expect("chat client");
    let answer = client
        .complete(
            CompletionRequest::new("Reply with one word.", "Say ready.")
                .temperature(0.0)
                .max_tokens(5),
        )
        .await
        .expect("chat completion");
    assert!(!answer.trim().is_empty());
    assert!(usage.summary().total_tokens > 0, "usage should be recorded");
}

#[tokio::test]
#[ignore = "Requires a RapidAPI key"]
async fn live_job_board_connection() {
    init_config_once();
    let board = RapidApiJobBoard::from_config(config::get_config()).expect("job board client");
    let status = board.test_connection().await;
    assert!(status.ok, "job board should accept the key: {status:?}");
}
