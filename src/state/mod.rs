use std::sync::Arc;
use std::time::Duration;

use crate::core::config::AppConfig;
use crate::llm::{EmbeddingProvider, LlmProvider, OllamaProvider};
use crate::rag::{AnswerSynthesizer, RagStore, Retriever, SqliteRagStore};

pub mod error;

use error::InitializationError;

/// Process-wide handles, built once at startup and shared by every route.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub rag_store: Arc<dyn RagStore>,
    pub llm: Arc<dyn LlmProvider>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub synthesizer: Arc<AnswerSynthesizer>,
}

impl AppState {
    /// Opens the vector index and builds the Ollama clients named in `config`.
    pub async fn initialize(config: AppConfig) -> Result<Arc<Self>, InitializationError> {
        let timeout = Duration::from_secs(config.models.request_timeout_secs);

        let rag_store = Arc::new(
            SqliteRagStore::with_path(config.storage.index_file())
                .await
                .map_err(|e| InitializationError::Rag(e.into()))?,
        );

        let llm = Arc::new(
            OllamaProvider::new(&config.models.ollama_base_url, &config.models.llm_model, timeout)
                .map_err(|e| InitializationError::Llm(e.into()))?,
        );
        let embedder = Arc::new(
            OllamaProvider::new(
                &config.models.ollama_base_url,
                &config.models.embedding_model,
                timeout,
            )
            .map_err(|e| InitializationError::Llm(e.into()))?,
        );

        let state = Self::from_parts(config, rag_store, embedder, llm);
        state.check_index_model().await;
        Ok(state)
    }

    pub fn from_parts(
        config: AppConfig,
        rag_store: Arc<dyn RagStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
    ) -> Arc<Self> {
        let retriever = Retriever::new(
            embedder.clone(),
            rag_store.clone(),
            config.retrieval.top_k,
        );
        let synthesizer = Arc::new(AnswerSynthesizer::new(retriever, llm.clone()));

        Arc::new(AppState {
            config: Arc::new(config),
            rag_store,
            llm,
            embedder,
            synthesizer,
        })
    }

    async fn check_index_model(&self) {
        let configured = self.embedder.model();
        match self.rag_store.embedding_model().await {
            Ok(Some(recorded)) if recorded != configured => tracing::warn!(
                "Index was built with embedding model '{}' but '{}' is configured; results will be poor until it is rebuilt",
                recorded,
                configured
            ),
            Ok(_) => {}
            Err(err) => tracing::warn!("Could not read index metadata: {}", err),
        }
    }
}
