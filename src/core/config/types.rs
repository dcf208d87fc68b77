use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Fully resolved service configuration. Built by [`super::ConfigService`]
/// from defaults, `config.yml` and environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub models: ModelsConfig,
    pub retrieval: RetrievalConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory holding the vector index.
    pub vector_db_path: PathBuf,
    /// Directory scanned by the `ingest` binary.
    pub documents_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelsConfig {
    pub llm_model: String,
    pub embedding_model: String,
    pub ollama_base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl StorageConfig {
    pub fn index_file(&self) -> PathBuf {
        self.vector_db_path.join("chunks.db")
    }
}
