//! Ingestion request/result types and collection stats

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Confirmation sentinel required to delete the whole collection
pub const DELETE_CONFIRMATION: &str = "DELETE_ALL";

/// Per-document ingestion options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestOptions {
    /// Text chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Additional document metadata carried onto every chunk
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            metadata: BTreeMap::new(),
        }
    }
}

/// Result of ingesting a single document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionResult {
    /// Original filename
    pub filename: String,

    /// Number of chunks created
    pub chunks_created: usize,

    /// Processing time in seconds
    pub processing_time: f64,

    /// File size in bytes
    pub file_size: usize,

    /// Whether ingestion was successful
    pub success: bool,

    /// Error message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestionResult {
    /// A failed result that contributed zero chunks
    pub fn failed(filename: impl Into<String>, file_size: usize, error: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            chunks_created: 0,
            processing_time: 0.0,
            file_size,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// A single file submitted for batch ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestFile {
    /// Filename, extension selects the text extractor
    pub filename: String,

    /// Raw file bytes
    pub bytes: Vec<u8>,
}

/// Request for batch ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchIngestionRequest {
    /// Files to ingest
    pub files: Vec<IngestFile>,

    /// Chunking options shared by all files
    #[serde(default)]
    pub options: IngestOptions,

    /// Process documents concurrently
    #[serde(default = "default_parallel")]
    pub parallel_processing: bool,
}

fn default_parallel() -> bool {
    true
}

/// Aggregate result of batch ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchIngestionResult {
    /// Total documents processed
    pub total_documents: usize,

    /// Number of successful ingestions
    pub successful_ingestions: usize,

    /// Number of failed ingestions
    pub failed_ingestions: usize,

    /// Total chunks created across all documents
    pub total_chunks_created: usize,

    /// Total processing time in seconds
    pub processing_time: f64,

    /// Individual document results, in submission order
    pub results: Vec<IngestionResult>,
}

impl BatchIngestionResult {
    /// Aggregate individual results into a batch summary
    pub fn from_results(results: Vec<IngestionResult>, processing_time: f64) -> Self {
        let successful = results.iter().filter(|r| r.success).count();
        let total_chunks = results.iter().map(|r| r.chunks_created).sum();
        Self {
            total_documents: results.len(),
            successful_ingestions: successful,
            failed_ingestions: results.len() - successful,
            total_chunks_created: total_chunks,
            processing_time,
            results,
        }
    }
}

/// Statistics about the document collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Type of vector store backing the collection
    pub vector_store_type: String,

    /// Total number of distinct documents
    pub total_documents: usize,

    /// Total number of chunks
    pub total_chunks: usize,

    /// Approximate storage size in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<usize>,

    /// Last update timestamp
    pub last_updated: DateTime<Utc>,
}

/// Request to delete the entire collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteCollectionRequest {
    /// Must equal [`DELETE_CONFIRMATION`]
    pub confirmation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_aggregation() {
        let results = vec![
            IngestionResult {
                filename: "a.txt".into(),
                chunks_created: 3,
                processing_time: 0.1,
                file_size: 2400,
                success: true,
                error: None,
            },
            IngestionResult::failed("b.pdf", 100, "extraction failed"),
        ];
        let batch = BatchIngestionResult::from_results(results, 0.2);
        assert_eq!(batch.total_documents, 2);
        assert_eq!(batch.successful_ingestions, 1);
        assert_eq!(batch.failed_ingestions, 1);
        assert_eq!(batch.total_chunks_created, 3);
    }
}
