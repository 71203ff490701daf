//! External search boundary
//!
//! The research stage treats external search as an optional collaborator
//! behind a trait. The default implementation is disabled and returns
//! nothing; tests use a deterministic mock.

use async_trait::async_trait;
use cognita_common::config::WebSearchConfig;
use cognita_common::errors::Result;
use cognita_common::models::{RecordMetadata, RetrievedPassage, SourceType};
use std::sync::Arc;

/// Trait for external search collaborators
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search the outside world for `query`, returning at most
    /// `max_results` passages tagged as external.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<RetrievedPassage>>;

    /// Whether this searcher can return results at all
    fn is_enabled(&self) -> bool {
        true
    }
}

/// Searcher used when external search is turned off. Always empty.
pub struct DisabledWebSearch;

#[async_trait]
impl WebSearcher for DisabledWebSearch {
    async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<RetrievedPassage>> {
        Ok(Vec::new())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Deterministic in-process searcher with a fixed result set.
///
/// Result ids are normalized URLs, which is what the citation tracker
/// keys external sources by.
pub struct MockWebSearcher {
    results: Vec<RetrievedPassage>,
}

impl MockWebSearcher {
    pub fn new(results: Vec<RetrievedPassage>) -> Self {
        Self { results }
    }

    /// A searcher with a small fixed corpus of external snippets
    pub fn with_canned_results() -> Self {
        let make = |url: &str, title: &str, content: &str, score: f32| RetrievedPassage {
            chunk_id: url.to_string(),
            content: content.to_string(),
            score,
            source_type: SourceType::ExternalSearch,
            title: title.to_string(),
            metadata: RecordMetadata::default(),
        };
        Self::new(vec![
            make(
                "https://example.org/overview",
                "Topic overview",
                "A broad overview of the topic from an external source.",
                0.6,
            ),
            make(
                "https://example.org/details",
                "Topic details",
                "Further detail on the topic from an external source.",
                0.5,
            ),
        ])
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<RetrievedPassage>> {
        Ok(self.results.iter().take(max_results).cloned().collect())
    }
}

/// Create a searcher based on configuration.
pub fn create_web_searcher(config: &WebSearchConfig) -> Arc<dyn WebSearcher> {
    if config.enabled {
        Arc::new(MockWebSearcher::with_canned_results())
    } else {
        Arc::new(DisabledWebSearch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_searcher_is_empty() {
        let searcher = DisabledWebSearch;
        assert!(!searcher.is_enabled());
        assert!(searcher.search("anything", 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mock_respects_max_results() {
        let searcher = MockWebSearcher::with_canned_results();
        assert_eq!(searcher.search("q", 1).await.unwrap().len(), 1);
        assert_eq!(searcher.search("q", 10).await.unwrap().len(), 2);
    }
}
