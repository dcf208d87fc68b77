#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::net::TcpListener;

use clinic_chat::core::config::service::resolve_config;
use clinic_chat::core::config::{AppConfig, AppPaths};
use clinic_chat::core::errors::ApiError;
use clinic_chat::llm::{ChatRequest, EmbeddingProvider, LlmProvider};
use clinic_chat::rag::{ChunkMetadata, ChunkSearchResult, RagStore, SqliteRagStore, StoredChunk};
use clinic_chat::server::router::router;
use clinic_chat::state::AppState;

const VOCABULARY: [&str; 6] = ["retinol", "sun", "sensitiv", "niacinamide", "acne", "moistur"];

pub struct KeywordEmbedder;

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    fn model(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        Ok(inputs
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                VOCABULARY
                    .iter()
                    .map(|stem| lower.matches(stem).count() as f32)
                    .collect()
            })
            .collect())
    }
}

/// Answers "Yes. <context>" or declines when the prompt has no context.
#[derive(Default)]
pub struct EchoLlm {
    pub prompts: Mutex<Vec<String>>,
    pub fail: bool,
}

#[async_trait]
impl LlmProvider for EchoLlm {
    fn model(&self) -> &str {
        "echo-model"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        Ok(!self.fail)
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError> {
        if self.fail {
            return Err(ApiError::ModelUnavailable("connection refused".to_string()));
        }
        let prompt = request.messages[0].content.clone();
        self.prompts.lock().unwrap().push(prompt.clone());

        let context = prompt
            .split("Context: ")
            .nth(1)
            .and_then(|rest| rest.split("\n\nQuestion:").next())
            .unwrap_or("")
            .trim()
            .to_string();
        if context.is_empty() {
            Ok("I don't know. The context does not contain enough information.".to_string())
        } else {
            Ok(format!("Yes. {}", context))
        }
    }
}

pub struct BrokenStore;

#[async_trait]
impl RagStore for BrokenStore {
    async fn insert_batch(&self, _items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ApiError> {
        Err(ApiError::IndexUnavailable("disk I/O error".to_string()))
    }

    async fn search(&self, _q: &[f32], _limit: usize) -> Result<Vec<ChunkSearchResult>, ApiError> {
        Err(ApiError::IndexUnavailable("disk I/O error".to_string()))
    }

    async fn count(&self) -> Result<usize, ApiError> {
        Err(ApiError::IndexUnavailable("disk I/O error".to_string()))
    }

    async fn embedding_model(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }

    async fn reset_with_model(&self, _model: &str) -> Result<(), ApiError> {
        Ok(())
    }
}

pub fn test_config(root: &Path) -> AppConfig {
    resolve_config(&json!({}), |_| None, &AppPaths::with_root(root.to_path_buf())).unwrap()
}

pub async fn sqlite_store(config: &AppConfig) -> Arc<SqliteRagStore> {
    Arc::new(SqliteRagStore::with_path(config.storage.index_file()).await.unwrap())
}

pub async fn seed(store: &SqliteRagStore, entries: &[(&str, &str)]) {
    let mut items = Vec::new();
    for (content, source) in entries {
        let mut metadata = ChunkMetadata::new();
        metadata.insert("source".to_string(), json!(source));
        let chunk = StoredChunk {
            chunk_id: source.to_string(),
            content: content.to_string(),
            source: source.to_string(),
            metadata,
        };
        items.push((chunk, KeywordEmbedder.embed_one(content).await.unwrap()));
    }
    store.insert_batch(items).await.unwrap();
}

/// Serves the real router on an ephemeral port and returns its base URL.
pub async fn spawn_app(state: Arc<AppState>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{}", addr)
}
