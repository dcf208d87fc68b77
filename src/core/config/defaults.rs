use serde_json::{json, Value};

pub const DEFAULT_PORT: u64 = 5000;
pub const DEFAULT_TOP_K: u64 = 5;
pub const DEFAULT_LLM_MODEL: &str = "llama2";
pub const DEFAULT_EMBEDDING_MODEL: &str = "all-minilm";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";

pub fn default_config() -> Value {
    json!({
        "server": {
            "host": "127.0.0.1",
            "port": DEFAULT_PORT,
            "cors_allowed_origins": default_local_origins(),
        },
        "storage": {
            "vector_db_path": "storage/vectordb",
            "documents_path": "storage/documents",
        },
        "models": {
            "llm_model": DEFAULT_LLM_MODEL,
            "embedding_model": DEFAULT_EMBEDDING_MODEL,
            "ollama_base_url": DEFAULT_OLLAMA_BASE_URL,
            "request_timeout_secs": 120,
        },
        "retrieval": {
            "top_k": DEFAULT_TOP_K,
        },
        "ingest": {
            "chunk_size": 500,
            "chunk_overlap": 50,
            "batch_size": 32,
        },
    })
}

pub fn default_local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}
