mod common;

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use clinic_chat::state::AppState;
use common::{seed, spawn_app, sqlite_store, test_config, BrokenStore, EchoLlm, KeywordEmbedder};

async fn seeded_app(tmp: &std::path::Path) -> String {
    let config = test_config(tmp);
    let store = sqlite_store(&config).await;
    seed(
        &store,
        &[
            ("Retinol increases sun sensitivity; use sunscreen daily.", "faq/retinol.md#0"),
            ("Niacinamide helps with acne and oil control.", "faq/niacinamide.md#0"),
        ],
    )
    .await;
    let state = AppState::from_parts(config, store, Arc::new(KeywordEmbedder), Arc::new(EchoLlm::default()));
    spawn_app(state).await
}

#[tokio::test]
async fn chat_answers_with_sources() {
    let tmp = tempfile::tempdir().unwrap();
    let base = seeded_app(tmp.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "query": "Can retinol make my skin sensitive to sun?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["answer"].as_str().unwrap().contains("sun sensitivity"));
    let sources = body["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0]["source"], json!("faq/retinol.md#0"));
    assert!(body.get("error").is_none());
}

#[tokio::test]
async fn chat_rejects_missing_or_empty_query() {
    let tmp = tempfile::tempdir().unwrap();
    let base = seeded_app(tmp.path()).await;
    let client = reqwest::Client::new();

    for payload in [json!({}), json!({ "query": "" }), json!({ "query": 42 })] {
        let res = client
            .post(format!("{}/chat", base))
            .json(&payload)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body, json!({ "error": "No query provided" }));
    }
}

#[tokio::test]
async fn chat_passes_whitespace_query_to_the_pipeline() {
    let tmp = tempfile::tempdir().unwrap();
    let base = seeded_app(tmp.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "query": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["answer"].is_string());
    assert!(body["sources"].is_array());
}

#[tokio::test]
async fn chat_rejects_malformed_json() {
    let tmp = tempfile::tempdir().unwrap();
    let base = seeded_app(tmp.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .header("content-type", "application/json")
        .body("{\"query\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn chat_on_empty_index_still_answers() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let store = sqlite_store(&config).await;
    let state = AppState::from_parts(config, store, Arc::new(KeywordEmbedder), Arc::new(EchoLlm::default()));
    let base = spawn_app(state).await;

    let res = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "query": "What are your opening hours?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["answer"].as_str().unwrap().contains("don't know"));
    assert_eq!(body["sources"], json!([]));
}

#[tokio::test]
async fn chat_reports_pipeline_failure_as_error_body() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let state = AppState::from_parts(
        config,
        Arc::new(BrokenStore),
        Arc::new(KeywordEmbedder),
        Arc::new(EchoLlm::default()),
    );
    let base = spawn_app(state).await;

    let res = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "query": "Does retinol burn?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(object["error"].as_str().unwrap().contains("disk I/O error"));
}

#[tokio::test]
async fn chat_reports_model_failure_as_error_body() {
    let tmp = tempfile::tempdir().unwrap();
    let config = test_config(tmp.path());
    let store = sqlite_store(&config).await;
    let llm = EchoLlm {
        fail: true,
        ..EchoLlm::default()
    };
    let state = AppState::from_parts(config, store, Arc::new(KeywordEmbedder), Arc::new(llm));
    let base = spawn_app(state).await;

    let res = reqwest::Client::new()
        .post(format!("{}/chat", base))
        .json(&json!({ "query": "Hello?" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn book_appointment_echoes_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let base = seeded_app(tmp.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{}/book-appointment", base))
        .json(&json!({
            "name": "Ana",
            "date": "2026-11-02",
            "time": "10:30",
            "contact": "ana@example.com",
            "notes": "first visit"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(
        body,
        json!({
            "message": "Appointment booked successfully",
            "appointment": {
                "name": "Ana",
                "date": "2026-11-02",
                "time": "10:30",
                "contact": "ana@example.com"
            }
        })
    );
}

#[tokio::test]
async fn book_appointment_requires_all_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let base = seeded_app(tmp.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{}/book-appointment", base))
        .json(&json!({ "name": "Ana", "date": "2026-11-02", "time": "10:30" }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Missing required fields" }));
}

#[tokio::test]
async fn health_reports_index_and_models() {
    let tmp = tempfile::tempdir().unwrap();
    let base = seeded_app(tmp.path()).await;

    let body: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["indexed_chunks"], json!(2));
    assert_eq!(body["llm_model"], json!("echo-model"));
    assert_eq!(body["embedding_model"], json!("keyword"));
}

#[tokio::test]
async fn health_fails_when_index_is_unreadable() {
    let tmp = tempfile::tempdir().unwrap();
    let state = AppState::from_parts(
        test_config(tmp.path()),
        Arc::new(BrokenStore),
        Arc::new(KeywordEmbedder),
        Arc::new(EchoLlm::default()),
    );
    let base = spawn_app(state).await;

    let res = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}
