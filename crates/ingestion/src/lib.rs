//! Cognita Ingestion
//!
//! Document ingestion pipeline:
//! - `extract`: per-format text extraction with size and type gates
//! - `chunker`: deterministic sliding-window chunking
//! - `indexer`: extract, chunk, embed and upsert with per-document isolation

pub mod chunker;
pub mod extract;
pub mod indexer;

pub use chunker::chunk_text;
pub use indexer::ChunkIndexer;
