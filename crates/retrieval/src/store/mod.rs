//! Vector store abstraction

use async_trait::async_trait;
use cognita_common::errors::Result;
use cognita_common::models::{CollectionStats, RetrievedPassage, VectorRecord};

pub mod memory;

pub use memory::InMemoryVectorStore;

/// Trait for vector storage backends
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace records by chunk id.
    ///
    /// Fails with a dimension mismatch if any embedding does not match the
    /// store's configured dimension; on failure no record from the batch is
    /// applied.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()>;

    /// Return up to `k` records most similar to `query`, sorted by
    /// descending score. Ties keep insertion order.
    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedPassage>>;

    /// Remove every record in the collection. Returns the number removed.
    async fn delete_all(&self) -> Result<usize>;

    /// Collection statistics
    async fn stats(&self) -> Result<CollectionStats>;

    /// Configured embedding dimension
    fn dimension(&self) -> usize;
}
