use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitializationError {
    #[error("Failed to open vector index: {0}")]
    Rag(#[source] anyhow::Error),

    #[error("Failed to initialize model clients: {0}")]
    Llm(#[source] anyhow::Error),
}
