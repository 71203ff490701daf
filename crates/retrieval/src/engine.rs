//! Retrieval engine
//!
//! Embeds the query, searches the vector store with bounded retry, applies
//! the score floor and result cap, and optionally reranks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cognita_common::config::RetrievalConfig;
use cognita_common::embeddings::Embedder;
use cognita_common::errors::{AppError, Result};
use cognita_common::models::{RetrievedPassage, SearchRequest, SearchResponse};

use crate::rerank::rerank;
use crate::store::VectorStore;

/// Similarity search over the indexed collection.
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: RetrievalConfig,
}

impl std::fmt::Debug for RetrievalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RetrievalEngine {
    /// Create an engine; fails if the embedder and store dimensions differ.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: RetrievalConfig,
    ) -> Result<Self> {
        if embedder.dimension() != store.dimension() {
            return Err(AppError::Config {
                message: format!(
                    "embedder dimension {} does not match store dimension {}",
                    embedder.dimension(),
                    store.dimension()
                ),
            });
        }
        Ok(Self {
            embedder,
            store,
            config,
        })
    }

    /// Retrieve passages for a search request.
    ///
    /// Returns at most `k` passages sorted by descending score. Passages
    /// below the configured score floor are dropped. An empty result list
    /// is a success, not an error.
    pub async fn retrieve(&self, request: &SearchRequest) -> Result<Vec<RetrievedPassage>> {
        if request.query.trim().is_empty() {
            return Err(AppError::Validation {
                message: "query must not be empty".to_string(),
            });
        }

        let mut passages = self.search_with_retry(&request.query, request.k).await?;

        if self.config.min_score > 0.0 {
            passages.retain(|p| p.score >= self.config.min_score);
        }

        if request.rerank {
            rerank(&request.query, &mut passages);
        }

        passages.truncate(request.k);
        Ok(passages)
    }

    /// Retrieve and wrap results in the wire response envelope.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let start = Instant::now();
        let passages = self.retrieve(request).await?;
        let total_found = passages.len();

        Ok(SearchResponse {
            query: request.query.clone(),
            results: passages.into_iter().map(Into::into).collect(),
            total_found,
            processing_time: start.elapsed().as_secs_f64(),
        })
    }

    async fn search_with_retry(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        let mut last_error = None;

        for attempt in 0..self.config.max_retries {
            if attempt > 0 {
                let delay =
                    Duration::from_millis(self.config.retry_backoff_ms * 2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }

            match self.search_once(query, k).await {
                Ok(passages) => return Ok(passages),
                // Mismatched dimensions and other permanent errors cannot
                // be fixed by retrying
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "Retrieval attempt failed, retrying"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(AppError::Retrieval {
            message: format!(
                "search failed after {} attempts: {}",
                self.config.max_retries,
                last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown error".to_string())
            ),
        })
    }

    async fn search_once(&self, query: &str, k: usize) -> Result<Vec<RetrievedPassage>> {
        let embedding = self.embedder.embed(query).await?;
        self.store.search(&embedding, k).await
    }

    /// Embedding dimension shared by the embedder and store
    pub fn dimension(&self) -> usize {
        self.store.dimension()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryVectorStore;
    use cognita_common::embeddings::MockEmbedder;
    use cognita_common::models::{RecordMetadata, VectorRecord};

    async fn engine_with_corpus(texts: &[&str]) -> RetrievalEngine {
        let embedder = Arc::new(MockEmbedder::new(64));
        let store = Arc::new(InMemoryVectorStore::new(64));

        let mut records = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let embedding = embedder.embed(text).await.unwrap();
            records.push(VectorRecord {
                chunk_id: format!("doc.txt_chunk_{}", i),
                embedding,
                content: text.to_string(),
                metadata: RecordMetadata {
                    filename: Some("doc.txt".to_string()),
                    position: Some(i),
                    extra: Default::default(),
                },
            });
        }
        store.upsert(records).await.unwrap();

        RetrievalEngine::new(embedder, store, RetrievalConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_dimension_mismatch_rejected_at_construction() {
        let embedder = Arc::new(MockEmbedder::new(128));
        let store = Arc::new(InMemoryVectorStore::new(64));
        let err =
            RetrievalEngine::new(embedder, store, RetrievalConfig::default()).unwrap_err();
        assert!(matches!(err, AppError::Config { .. }));
    }

    #[tokio::test]
    async fn test_k_caps_results_but_small_corpus_returns_all() {
        let engine = engine_with_corpus(&["alpha", "beta", "gamma", "delta"]).await;

        let mut request = SearchRequest::new("alpha");
        request.k = 10;
        let results = engine.retrieve(&request).await.unwrap();
        assert_eq!(results.len(), 4);

        request.k = 2;
        let results = engine.retrieve(&request).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_identical_text_ranks_first() {
        let engine = engine_with_corpus(&["the quick brown fox", "unrelated passage"]).await;

        let results = engine
            .retrieve(&SearchRequest::new("the quick brown fox"))
            .await
            .unwrap();
        assert_eq!(results[0].content, "the quick brown fox");
        // Identical text maps to the identical unit vector
        assert!((results[0].score - 1.0).abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_empty_query_is_validation_error() {
        let engine = engine_with_corpus(&["alpha"]).await;
        let err = engine
            .retrieve(&SearchRequest::new("   "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_empty_corpus_is_success() {
        let engine = engine_with_corpus(&[]).await;
        let results = engine
            .retrieve(&SearchRequest::new("anything"))
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_envelope() {
        let engine = engine_with_corpus(&["alpha", "beta"]).await;
        let response = engine.search(&SearchRequest::new("alpha")).await.unwrap();
        assert_eq!(response.query, "alpha");
        assert_eq!(response.total_found, 2);
        assert_eq!(response.results.len(), 2);
    }
}
