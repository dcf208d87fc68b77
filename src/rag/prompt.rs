use super::store::ChunkSearchResult;

const INSTRUCTIONS: &str = "Use the following pieces of context to answer the question at the end.\n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

const CHUNK_SEPARATOR: &str = "\n\n";

/// Joins chunk texts in retrieval order.
pub fn build_context(chunks: &[ChunkSearchResult]) -> String {
    chunks
        .iter()
        .map(|result| result.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join(CHUNK_SEPARATOR)
}

/// Renders the grounded-answer prompt around `context` and the verbatim question.
pub fn render_prompt(context: &str, question: &str) -> String {
    format!(
        "{}\n\nContext: {}\n\nQuestion: {}\n\nAnswer:",
        INSTRUCTIONS, context, question
    )
}
