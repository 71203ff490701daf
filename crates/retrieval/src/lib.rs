//! Cognita Retrieval
//!
//! Vector storage and similarity search:
//! - `store`: the vector store trait and the in-memory backend
//! - `engine`: query embedding, bounded-retry search, score floor and cap
//! - `rerank`: secondary lexical relevance scoring

pub mod engine;
pub mod rerank;
pub mod store;

pub use engine::RetrievalEngine;
pub use store::{InMemoryVectorStore, VectorStore};
