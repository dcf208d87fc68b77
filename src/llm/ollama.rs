use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::{EmbeddingProvider, LlmProvider};
use super::types::{ChatMessage, ChatRequest};
use crate::core::errors::ApiError;

/// Client for one model on an Ollama server.
///
/// The same type backs both the chat model and the embedding model; build
/// one instance per model id.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    model: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::internal)?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
        })
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::ModelUnavailable(format!("{} request failed: {}", url, e)))?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
                .unwrap_or(text);
            return Err(ApiError::ModelUnavailable(format!(
                "ollama model '{}' returned {}: {}",
                self.model, status, detail
            )));
        }

        res.json().await.map_err(ApiError::model)
    }
}

#[derive(Deserialize)]
struct OllamaChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/tags", self.base_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn chat(&self, request: ChatRequest) -> Result<String, ApiError> {
        let body = json!({
            "model": self.model,
            "messages": request.messages,
            "stream": false,
        });

        let payload = self.post_json("/api/chat", &body).await?;
        let response: OllamaChatResponse = serde_json::from_value(payload).map_err(|e| {
            ApiError::ModelUnavailable(format!("unexpected chat response from ollama: {}", e))
        })?;

        Ok(response.message.content)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let payload = self.post_json("/api/embed", &body).await?;
        let response: OllamaEmbedResponse = serde_json::from_value(payload).map_err(|e| {
            ApiError::ModelUnavailable(format!("unexpected embed response from ollama: {}", e))
        })?;

        if response.embeddings.len() != inputs.len() {
            return Err(ApiError::ModelUnavailable(format!(
                "embedding model '{}' returned {} vectors for {} inputs",
                self.model,
                response.embeddings.len(),
                inputs.len()
            )));
        }

        Ok(response.embeddings)
    }
}
