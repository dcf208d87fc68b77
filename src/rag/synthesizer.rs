//! Answer synthesis: retrieve, render the grounded prompt, generate.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::prompt::{build_context, render_prompt};
use super::retriever::Retriever;
use super::store::ChunkMetadata;
use crate::core::errors::ApiError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};

/// The only shapes `get_response` produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChatResponse {
    Answer {
        answer: String,
        /// Metadata of every chunk placed in the prompt, in prompt order.
        sources: Vec<ChunkMetadata>,
    },
    Error {
        error: String,
    },
}

impl ChatResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, ChatResponse::Error { .. })
    }
}

pub struct AnswerSynthesizer {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
}

impl AnswerSynthesizer {
    pub fn new(retriever: Retriever, llm: Arc<dyn LlmProvider>) -> Self {
        Self { retriever, llm }
    }

    /// Answers `query` from the index. Never fails: any embedding, index or
    /// model error becomes [`ChatResponse::Error`].
    pub async fn get_response(&self, query: &str) -> ChatResponse {
        match self.answer(query).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("Chat pipeline failed: {}", err);
                ChatResponse::Error {
                    error: err.to_string(),
                }
            }
        }
    }

    async fn answer(&self, query: &str) -> Result<ChatResponse, ApiError> {
        let retrieved = self.retriever.retrieve(query).await?;
        tracing::info!(
            query_chars = query.chars().count(),
            retrieved = retrieved.len(),
            "Retrieved context chunks"
        );

        let prompt = render_prompt(&build_context(&retrieved), query);
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);
        let answer = self.llm.chat(request).await?;

        // Sources come from the same retrieval that built the prompt.
        let sources = retrieved
            .into_iter()
            .map(|result| result.chunk.metadata)
            .collect();

        Ok(ChatResponse::Answer { answer, sources })
    }
}
