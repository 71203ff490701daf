//! Retrieved passages and search request/response types

use serde::{Deserialize, Serialize};

use super::document::RecordMetadata;

/// Where a piece of evidence came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    /// Retrieved from the internal document corpus
    InternalDocument,
    /// Returned by the external search collaborator
    ExternalSearch,
}

/// A passage retrieved for a query, internal or external.
///
/// Result lists are sorted by descending score; ties keep their original
/// insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedPassage {
    /// Chunk id for internal passages, normalized URL for external results
    pub chunk_id: String,

    /// Passage content (snippet for external results)
    pub content: String,

    /// Relevance score, higher is more relevant
    pub score: f32,

    /// Source classification
    pub source_type: SourceType,

    /// Human-readable source title
    pub title: String,

    /// Source metadata
    pub metadata: RecordMetadata,
}

/// Search request parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Query text
    pub query: String,

    /// Maximum results to return
    #[serde(default = "default_k")]
    pub k: usize,

    /// Whether to apply the secondary relevance scorer
    #[serde(default)]
    pub rerank: bool,
}

fn default_k() -> usize {
    10
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: default_k(),
            rerank: false,
        }
    }
}

/// A single search result on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Passage content
    pub content: String,

    /// Passage metadata
    pub metadata: RecordMetadata,

    /// Similarity score
    pub score: f32,

    /// Chunk identifier
    pub chunk_id: String,
}

/// Search response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Original query
    pub query: String,

    /// Ranked results
    pub results: Vec<SearchResult>,

    /// Number of results found
    pub total_found: usize,

    /// Search processing time in seconds
    pub processing_time: f64,
}

impl From<RetrievedPassage> for SearchResult {
    fn from(p: RetrievedPassage) -> Self {
        Self {
            content: p.content,
            metadata: p.metadata,
            score: p.score,
            chunk_id: p.chunk_id,
        }
    }
}
