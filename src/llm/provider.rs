use async_trait::async_trait;

use super::types::ChatRequest;
use crate::core::errors::ApiError;

/// A chat model bound to one model id at construction.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// the model id every request is sent to
    fn model(&self) -> &str;

    /// check if the model server is reachable
    async fn health_check(&self) -> Result<bool, ApiError>;

    /// chat completion (non-streaming)
    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError>;
}

/// Text to fixed-dimension vector, deterministic for a given model version.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    fn model(&self) -> &str;

    /// One vector per input, in input order.
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    async fn embed_one(&self, input: &str) -> Result<Vec<f32>, ApiError> {
        let mut vectors = self.embed(&[input.to_string()]).await?;
        match vectors.pop() {
            Some(vector) if !vector.is_empty() => Ok(vector),
            _ => Err(ApiError::ModelUnavailable(format!(
                "embedding model '{}' returned no vector",
                self.model()
            ))),
        }
    }
}
