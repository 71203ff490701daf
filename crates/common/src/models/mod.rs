//! Core domain and wire models
//!
//! Organized by concern:
//! - `document`: documents, chunks and vector records
//! - `passage`: retrieved passages and search request/response types
//! - `citation`: per-answer citations
//! - `chat`: chat request/response envelope and workflow metadata
//! - `ingest`: ingestion request/result types and collection stats
//! - `workflow`: workflow state machine data
//! - `health`: component health reporting

pub mod chat;
pub mod citation;
pub mod document;
pub mod health;
pub mod ingest;
pub mod passage;
pub mod workflow;

pub use chat::{ChatRequest, ChatResponse, StylePreferences, WorkflowMetadata};
pub use citation::Citation;
pub use document::{Chunk, Document, RecordMetadata, VectorRecord};
pub use health::{ComponentHealth, HealthReport, HealthStatus};
pub use ingest::{
    BatchIngestionRequest, BatchIngestionResult, CollectionStats, DeleteCollectionRequest,
    IngestFile, IngestOptions, IngestionResult, DELETE_CONFIRMATION,
};
pub use passage::{RetrievedPassage, SearchRequest, SearchResponse, SearchResult, SourceType};
pub use workflow::{Insight, ReasoningOutput, WorkflowStage, WorkflowState, WorkflowStatus};
