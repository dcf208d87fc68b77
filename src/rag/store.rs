//! RagStore trait — abstract interface for the document index.
//!
//! The service reads through `search`; the `ingest` binary writes through
//! `insert_batch` and `reset_with_model`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::ApiError;

/// Chunk metadata: string keys to scalar JSON values.
pub type ChunkMetadata = Map<String, Value>;

/// A stored chunk of ingested document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source identifier (document path relative to the documents directory).
    pub source: String,
    pub metadata: ChunkMetadata,
}

/// Result of a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkSearchResult {
    pub chunk: StoredChunk,
    /// Similarity score (higher = better).
    pub score: f32,
}

#[async_trait]
pub trait RagStore: Send + Sync {
    /// Insert chunks with their embeddings. Visible to `search` once this returns.
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ApiError>;

    /// Up to `limit` chunks ordered by descending similarity to `query_embedding`.
    ///
    /// Equal scores keep insertion order, so results are stable for a fixed
    /// index state.
    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError>;

    async fn count(&self) -> Result<usize, ApiError>;

    /// Embedding model that produced the stored vectors, if recorded.
    async fn embedding_model(&self) -> Result<Option<String>, ApiError>;

    /// Drop every chunk and record `embedding_model` as the index's model.
    async fn reset_with_model(&self, embedding_model: &str) -> Result<(), ApiError>;
}
