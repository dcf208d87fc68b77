//! SQLite-backed document index.
//!
//! In-process vector store using SQLite for chunk text and metadata and
//! brute-force cosine similarity for search.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{ChunkMetadata, ChunkSearchResult, RagStore, StoredChunk};
use crate::core::errors::ApiError;

pub struct SqliteRagStore {
    pool: SqlitePool,
    db_path: PathBuf,
}

impl SqliteRagStore {
    /// Opens the index file, creating it (and its directory) when missing.
    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        if !db_path.exists() {
            tracing::warn!(
                "Vector index not found at {}; starting with an empty index",
                db_path.display()
            );
            if let Some(parent) = db_path.parent() {
                std::fs::create_dir_all(parent).map_err(ApiError::index)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::index)?;

        let store = Self { pool, db_path };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_chunks (
                chunk_id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                metadata TEXT NOT NULL DEFAULT '{}',
                embedding BLOB,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::index)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_rag_source ON rag_chunks(source)")
            .execute(&self.pool)
            .await
            .map_err(ApiError::index)?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS rag_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::index)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow) -> StoredChunk {
        let metadata_str: String = row.get("metadata");
        let metadata = match serde_json::from_str::<Value>(&metadata_str) {
            Ok(Value::Object(map)) => map,
            _ => ChunkMetadata::new(),
        };

        StoredChunk {
            chunk_id: row.get("chunk_id"),
            content: row.get("content"),
            source: row.get("source"),
            metadata,
        }
    }
}

#[async_trait]
impl RagStore for SqliteRagStore {
    async fn insert_batch(&self, items: Vec<(StoredChunk, Vec<f32>)>) -> Result<(), ApiError> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await.map_err(ApiError::index)?;

        for (chunk, embedding) in &items {
            let blob = Self::serialize_embedding(embedding);
            let metadata_str =
                serde_json::to_string(&chunk.metadata).map_err(ApiError::internal)?;

            sqlx::query(
                "INSERT OR REPLACE INTO rag_chunks (chunk_id, content, source, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(&chunk.chunk_id)
            .bind(&chunk.content)
            .bind(&chunk.source)
            .bind(&metadata_str)
            .bind(&blob)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::index)?;
        }

        tx.commit().await.map_err(ApiError::index)?;
        Ok(())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        limit: usize,
    ) -> Result<Vec<ChunkSearchResult>, ApiError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            "SELECT chunk_id, content, source, metadata, embedding
             FROM rag_chunks
             ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::index)?;

        let mut scored: Vec<ChunkSearchResult> = rows
            .iter()
            .map(|row| {
                let embedding_bytes: Option<Vec<u8>> = row.get("embedding");
                let stored_emb = Self::deserialize_embedding(&embedding_bytes.unwrap_or_default());
                let score = Self::cosine_similarity(query_embedding, &stored_emb);

                ChunkSearchResult {
                    chunk: Self::row_to_chunk(row),
                    score,
                }
            })
            .collect();

        // sort_by is stable: equal scores keep rowid order.
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        Ok(scored)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rag_chunks")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::index)?;

        Ok(count as usize)
    }

    async fn embedding_model(&self) -> Result<Option<String>, ApiError> {
        sqlx::query_scalar("SELECT value FROM rag_meta WHERE key = 'embedding_model'")
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::index)
    }

    async fn reset_with_model(&self, embedding_model: &str) -> Result<(), ApiError> {
        let mut tx = self.pool.begin().await.map_err(ApiError::index)?;

        sqlx::query("DELETE FROM rag_chunks")
            .execute(&mut *tx)
            .await
            .map_err(ApiError::index)?;

        sqlx::query(
            "INSERT OR REPLACE INTO rag_meta (key, value, updated_at)
             VALUES ('embedding_model', ?1, STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))",
        )
        .bind(embedding_model)
        .execute(&mut *tx)
        .await
        .map_err(ApiError::index)?;

        tx.commit().await.map_err(ApiError::index)?;
        Ok(())
    }
}
