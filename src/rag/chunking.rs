//! Splits document text into overlapping chunks for ingestion.

use serde::{Deserialize, Serialize};

use crate::core::config::IngestConfig;

/// A slice of a source document, before embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    pub text: String,
    /// Source identifier (document path relative to the documents directory).
    pub source: String,
    /// Character offset in the original document.
    pub start_offset: usize,
    /// Chunk index within the source.
    pub chunk_index: usize,
}

pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    /// Split text into windows of at most `chunk_size` characters. Windows
    /// that do not reach the end of the text are cut back to a sentence
    /// boundary when one falls in their last 20%. The next window starts
    /// `chunk_overlap` characters before the end of the previous cut, so every
    /// character lands in some chunk. Whitespace-only windows are dropped.
    pub fn split(&self, text: &str, source: &str) -> Vec<TextChunk> {
        let chars: Vec<char> = text.chars().collect();
        let total_chars = chars.len();
        let mut chunks = Vec::new();

        if total_chars == 0 {
            return chunks;
        }

        let mut start = 0;

        while start < total_chars {
            let end = (start + self.chunk_size).min(total_chars);
            let window: String = chars[start..end].iter().collect();

            let cut = if end < total_chars {
                find_sentence_boundary(&window)
            } else {
                window.as_str()
            };

            let trimmed = cut.trim();
            if !trimmed.is_empty() {
                let leading = cut.chars().take_while(|c| c.is_whitespace()).count();
                chunks.push(TextChunk {
                    text: trimmed.to_string(),
                    source: source.to_string(),
                    start_offset: start + leading,
                    chunk_index: chunks.len(),
                });
            }

            if end == total_chars {
                break;
            }
            let cut_end = start + cut.chars().count();
            start = cut_end.saturating_sub(self.chunk_overlap).max(start + 1);
        }

        chunks
    }
}

/// Longest prefix of `text` ending at a sentence break inside its last 20%,
/// or the whole text when there is none.
fn find_sentence_boundary(text: &str) -> &str {
    const SENTENCE_ENDINGS: [&str; 6] = [". ", "! ", "? ", ".\n", "!\n", "?\n"];

    let char_count = text.chars().count();
    let search_start = text
        .char_indices()
        .nth(char_count * 80 / 100)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let search_text = &text[search_start..];

    let best = SENTENCE_ENDINGS
        .iter()
        .filter_map(|ending| search_text.rfind(ending).map(|pos| pos + ending.len()))
        .max();

    match best {
        Some(pos) => &text[..search_start + pos],
        None => text,
    }
}
