use std::sync::Arc;

use super::store::{ChunkSearchResult, RagStore};
use crate::core::errors::ApiError;
use crate::llm::EmbeddingProvider;

/// Fixed top-k retrieval over the document index.
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn RagStore>,
    top_k: usize,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn RagStore>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
        }
    }

    /// Embed `query` and return at most `top_k` chunks, best first.
    ///
    /// A short result is not an error; it means the index holds fewer chunks.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ChunkSearchResult>, ApiError> {
        let query_embedding = self.embedder.embed_one(query).await?;
        self.store.search(&query_embedding, self.top_k).await
    }
}
