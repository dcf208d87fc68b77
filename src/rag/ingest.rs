//! Offline ingestion: documents directory → chunks → embeddings → index.

use std::path::Path;

use serde_json::json;
use walkdir::WalkDir;

use super::chunking::{TextChunk, TextChunker};
use super::store::{ChunkMetadata, RagStore, StoredChunk};
use crate::core::errors::ApiError;
use crate::llm::EmbeddingProvider;

const DOCUMENT_EXTENSIONS: [&str; 3] = ["md", "markdown", "txt"];

/// A document read from disk, keyed by its path relative to the documents root.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDocument {
    pub source: String,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    pub documents: usize,
    pub chunks: usize,
}

/// Reads every text/markdown file under `root`, in path order.
pub fn collect_documents(root: &Path) -> Result<Vec<SourceDocument>, ApiError> {
    if !root.is_dir() {
        return Err(ApiError::Config(format!(
            "documents directory {} does not exist",
            root.display()
        )));
    }

    let mut documents = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(ApiError::internal)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !supported {
            tracing::debug!("Skipping {}", path.display());
            continue;
        }

        let text = std::fs::read_to_string(path)
            .map_err(|e| ApiError::Internal(format!("failed to read {}: {}", path.display(), e)))?;
        let source = path
            .strip_prefix(root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        documents.push(SourceDocument { source, text });
    }

    Ok(documents)
}

/// Makes the index ready to receive vectors from `embedding_model`.
///
/// With `rebuild` the index is emptied first. Otherwise an index built with a
/// different embedding model is refused, since its vectors are not comparable.
pub async fn prepare_index(
    store: &dyn RagStore,
    embedding_model: &str,
    rebuild: bool,
) -> Result<(), ApiError> {
    if rebuild {
        tracing::info!("Rebuilding index for embedding model '{}'", embedding_model);
        return store.reset_with_model(embedding_model).await;
    }

    match store.embedding_model().await? {
        Some(existing) if existing != embedding_model => Err(ApiError::Config(format!(
            "index was built with embedding model '{}' but '{}' is configured; rerun with --rebuild",
            existing, embedding_model
        ))),
        Some(_) => Ok(()),
        None if store.count().await? == 0 => store.reset_with_model(embedding_model).await,
        None => {
            tracing::warn!("Index has chunks but no recorded embedding model");
            Ok(())
        }
    }
}

pub fn to_stored_chunk(chunk: &TextChunk) -> StoredChunk {
    let mut metadata = ChunkMetadata::new();
    metadata.insert("source".to_string(), json!(chunk.source));
    metadata.insert("chunk".to_string(), json!(chunk.chunk_index));
    metadata.insert("start_offset".to_string(), json!(chunk.start_offset));

    StoredChunk {
        chunk_id: format!("{}#{}", chunk.source, chunk.chunk_index),
        content: chunk.text.clone(),
        source: chunk.source.clone(),
        metadata,
    }
}

/// Chunks, embeds and stores `documents`, `batch_size` chunks per embedding call.
pub async fn ingest_documents(
    documents: &[SourceDocument],
    chunker: &TextChunker,
    embedder: &dyn EmbeddingProvider,
    store: &dyn RagStore,
    batch_size: usize,
) -> Result<IngestReport, ApiError> {
    let chunks: Vec<StoredChunk> = documents
        .iter()
        .flat_map(|doc| chunker.split(&doc.text, &doc.source))
        .map(|chunk| to_stored_chunk(&chunk))
        .collect();

    for batch in chunks.chunks(batch_size.max(1)) {
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(ApiError::ModelUnavailable(format!(
                "embedding model '{}' returned {} vectors for {} chunks",
                embedder.model(),
                embeddings.len(),
                batch.len()
            )));
        }

        let items = batch.iter().cloned().zip(embeddings).collect();
        store.insert_batch(items).await?;
        tracing::info!("Stored {} chunks", batch.len());
    }

    Ok(IngestReport {
        documents: documents.len(),
        chunks: chunks.len(),
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::rag::sqlite::SqliteRagStore;

    struct LengthEmbedder;

    #[async_trait]
    impl EmbeddingProvider for LengthEmbedder {
        fn model(&self) -> &str {
            "length"
        }

        async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs
                .iter()
                .map(|t| vec![t.len() as f32, 1.0])
                .collect())
        }
    }

    async fn temp_store(dir: &Path) -> SqliteRagStore {
        SqliteRagStore::with_path(dir.join("vectordb").join("chunks.db"))
            .await
            .unwrap()
    }

    #[test]
    fn collects_supported_files_with_relative_sources() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("documents");
        std::fs::create_dir_all(docs.join("faq")).unwrap();
        std::fs::write(docs.join("faq").join("retinol.md"), "Retinol facts.").unwrap();
        std::fs::write(docs.join("hours.txt"), "Open daily.").unwrap();
        std::fs::write(docs.join("logo.png"), [0u8, 1, 2]).unwrap();

        let documents = collect_documents(&docs).unwrap();
        let sources: Vec<&str> = documents.iter().map(|d| d.source.as_str()).collect();

        assert_eq!(sources, vec!["faq/retinol.md", "hours.txt"]);
        assert_eq!(documents[0].text, "Retinol facts.");
    }

    #[test]
    fn missing_documents_directory_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(collect_documents(&tmp.path().join("nope")).is_err());
    }

    #[test]
    fn stored_chunk_carries_source_metadata() {
        let chunk = TextChunk {
            text: "Retinol increases sun sensitivity.".to_string(),
            source: "faq.md".to_string(),
            start_offset: 120,
            chunk_index: 3,
        };
        let stored = to_stored_chunk(&chunk);

        assert_eq!(stored.chunk_id, "faq.md#3");
        assert_eq!(
            serde_json::Value::Object(stored.metadata),
            json!({ "source": "faq.md", "chunk": 3, "start_offset": 120 })
        );
    }

    #[tokio::test]
    async fn ingest_documents_writes_all_chunks_in_batches() {
        let tmp = tempfile::tempdir().unwrap();
        let store = temp_store(tmp.path()).await;
        let documents = vec![
            SourceDocument {
                source: "a.md".to_string(),
                text: "First sentence here. Second sentence here. Third one.".to_string(),
            },
            SourceDocument {
                source: "b.md".to_string(),
                text: "Short.".to_string(),
            },
        ];

        let report = ingest_documents(&documents, &TextChunker::new(20, 5), &LengthEmbedder, &store, 2)
            .await
            .unwrap();

        assert_eq!(report.documents, 2);
        assert_eq!(report.chunks, 5);
        assert_eq!(store.count().await.unwrap(), 5);

        let results = store.search(&[6.0, 1.0], 10).await.unwrap();
        let mut ids: Vec<String> = results.into_iter().map(|r| r.chunk.chunk_id).collect();
        ids.sort();
        assert_eq!(ids, vec!["a.md#0", "a.md#1", "a.md#2", "a.md#3", "b.md#0"]);
    }

    #[tokio::test]
    async fn prepare_index_records_model_and_refuses_mismatch() {
        let tmp = tempfile::tempdir().unwrap();
        let store = temp_store(tmp.path()).await;

        prepare_index(&store, "all-minilm", false).await.unwrap();
        assert_eq!(store.embedding_model().await.unwrap().as_deref(), Some("all-minilm"));

        let err = prepare_index(&store, "nomic-embed-text", false).await.unwrap_err();
        assert!(err.to_string().contains("--rebuild"));

        prepare_index(&store, "nomic-embed-text", true).await.unwrap();
        assert_eq!(
            store.embedding_model().await.unwrap().as_deref(),
            Some("nomic-embed-text")
        );
    }
}
