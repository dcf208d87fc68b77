//! Retrieval-augmented generation.
//!
//! - `RagStore` / `SqliteRagStore`: the persisted document index
//! - `Retriever`: top-k embedding search over the index
//! - `AnswerSynthesizer`: grounded prompt + generation with source citations
//! - `ingest`: offline loading of the documents directory into the index

pub mod chunking;
pub mod ingest;
pub mod prompt;
pub mod retriever;
pub mod sqlite;
pub mod store;
pub mod synthesizer;

pub use chunking::{TextChunk, TextChunker};
pub use retriever::Retriever;
pub use sqlite::SqliteRagStore;
pub use store::{ChunkMetadata, ChunkSearchResult, RagStore, StoredChunk};
pub use synthesizer::{AnswerSynthesizer, ChatResponse};
