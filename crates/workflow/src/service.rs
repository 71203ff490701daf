//! Assistant service facade
//!
//! Wires the ingestion, retrieval and workflow components together behind
//! one library surface. Construction from `AppConfig` picks providers (real
//! or mock) and shares one embedder and one vector store across ingestion
//! and retrieval so dimensions always agree.

use std::sync::Arc;

use cognita_common::config::AppConfig;
use cognita_common::embeddings::{create_embedder, Embedder};
use cognita_common::errors::{AppError, Result};
use cognita_common::generation::create_generator;
use cognita_common::models::{
    BatchIngestionRequest, BatchIngestionResult, ChatRequest, ChatResponse, CollectionStats,
    ComponentHealth, HealthReport, HealthStatus, IngestFile, IngestOptions, IngestionResult,
    SearchRequest, SearchResponse, DELETE_CONFIRMATION,
};
use cognita_common::session::SessionStore;
use cognita_ingestion::ChunkIndexer;
use cognita_retrieval::store::InMemoryVectorStore;
use cognita_retrieval::{RetrievalEngine, VectorStore};

use crate::orchestrator::WorkflowOrchestrator;
use crate::stages::{ReasoningStage, ResearchStage, WriterStage};
use crate::websearch::create_web_searcher;

/// The research assistant engine.
pub struct Assistant {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    indexer: ChunkIndexer,
    engine: Arc<RetrievalEngine>,
    orchestrator: WorkflowOrchestrator,
    sessions: Arc<SessionStore>,
    generation_is_mock: bool,
}

impl Assistant {
    /// Build the full engine from configuration.
    pub fn new(config: AppConfig) -> Result<Self> {
        let embedder = create_embedder(&config.embedding)?;
        let store: Arc<dyn VectorStore> =
            Arc::new(InMemoryVectorStore::new(config.embedding.dimension));

        let indexer = ChunkIndexer::new(
            Arc::clone(&embedder),
            Arc::clone(&store),
            config.chunking.clone(),
        );

        let engine = Arc::new(RetrievalEngine::new(
            Arc::clone(&embedder),
            Arc::clone(&store),
            config.retrieval.clone(),
        )?);

        let generator = create_generator(&config.generation)?;
        let generation_is_mock = config.generation.api_key.is_empty();
        let searcher = create_web_searcher(&config.web_search);

        let sessions = Arc::new(SessionStore::new(config.session_ttl()));

        let orchestrator = WorkflowOrchestrator::new(
            ResearchStage::new(Arc::clone(&engine), searcher, config.web_search.clone()),
            ReasoningStage::new(),
            WriterStage::new(generator),
            Arc::clone(&sessions),
            config.workflow.clone(),
        );

        Ok(Self {
            embedder,
            store,
            indexer,
            engine,
            orchestrator,
            sessions,
            generation_is_mock,
        })
    }

    /// Ingest a single document; errors are captured in the result.
    pub async fn ingest_document(
        &self,
        file: &IngestFile,
        options: &IngestOptions,
    ) -> IngestionResult {
        self.indexer.ingest(file, options).await
    }

    /// Ingest a batch of documents with per-document failure isolation.
    pub async fn ingest_batch(&self, request: &BatchIngestionRequest) -> BatchIngestionResult {
        self.indexer.ingest_batch(request).await
    }

    /// Collection statistics
    pub async fn collection_stats(&self) -> Result<CollectionStats> {
        self.store.stats().await
    }

    /// Delete every indexed chunk. Requires the literal confirmation
    /// sentinel; anything else is rejected without touching the store.
    pub async fn delete_collection(&self, confirmation: &str) -> Result<usize> {
        if confirmation != DELETE_CONFIRMATION {
            return Err(AppError::InvalidConfirmation {
                expected: DELETE_CONFIRMATION.to_string(),
            });
        }
        let removed = self.store.delete_all().await?;
        tracing::info!(removed, "Collection deleted");
        Ok(removed)
    }

    /// Similarity search over the indexed collection.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.engine.search(request).await
    }

    /// Run the research workflow for one query.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.orchestrator.run(request).await
    }

    /// Drop a session. Returns whether it existed.
    pub async fn clear_session(&self, session_id: &str) -> bool {
        self.sessions.clear(session_id).await
    }

    /// Drop all sessions past their TTL. Returns the number removed.
    pub async fn purge_expired_sessions(&self) -> usize {
        self.sessions.purge_expired().await
    }

    /// Aggregate component health.
    pub async fn health(&self) -> HealthReport {
        let store_health = match self.store.stats().await {
            Ok(stats) => ComponentHealth {
                name: "vector_store".to_string(),
                status: HealthStatus::Healthy,
                detail: Some(format!("{} chunks indexed", stats.total_chunks)),
            },
            Err(e) => ComponentHealth {
                name: "vector_store".to_string(),
                status: HealthStatus::Unhealthy,
                detail: Some(e.to_string()),
            },
        };

        let generation_health = if self.generation_is_mock {
            ComponentHealth {
                name: "generation".to_string(),
                status: HealthStatus::Degraded,
                detail: Some("no api key configured, using mock".to_string()),
            }
        } else {
            ComponentHealth {
                name: "generation".to_string(),
                status: HealthStatus::Healthy,
                detail: None,
            }
        };

        HealthReport::aggregate(vec![
            ComponentHealth {
                name: "embedding".to_string(),
                status: HealthStatus::Healthy,
                detail: Some(self.embedder.model_name().to_string()),
            },
            store_health,
            generation_health,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_assistant() -> Assistant {
        let mut config = AppConfig::default();
        config.embedding.provider = "mock".to_string();
        config.embedding.dimension = 64;
        Assistant::new(config).unwrap()
    }

    fn file(filename: &str, text: &str) -> IngestFile {
        IngestFile {
            filename: filename.to_string(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_chat_on_empty_corpus_succeeds_without_citations() {
        let assistant = test_assistant();
        let response = assistant
            .chat(&ChatRequest::new("what is in the collection?"))
            .await
            .unwrap();

        assert!(response.success);
        assert!(response.citations.is_empty());
        assert!(response.metadata.quality_score < crate::orchestrator::QUALITY_THRESHOLD);
        assert!(!response.answer.is_empty());
    }

    #[tokio::test]
    async fn test_ingest_then_chat_produces_citations() {
        let assistant = test_assistant();
        let result = assistant
            .ingest_document(
                &file(
                    "chunking.txt",
                    "Chunking splits long documents into overlapping windows. \
                     Overlap preserves context across chunk boundaries.",
                ),
                &IngestOptions::default(),
            )
            .await;
        assert!(result.success);

        let response = assistant
            .chat(&ChatRequest::new("how does chunking work and why use overlap?"))
            .await
            .unwrap();

        assert!(response.success);
        assert!(!response.citations.is_empty());
        assert!(response.metadata.quality_score >= crate::orchestrator::QUALITY_THRESHOLD);
        assert!(response.answer.contains("[1]"));
        assert!(response
            .metadata
            .steps_completed
            .contains(&"research".to_string()));
        assert!(response
            .metadata
            .steps_completed
            .contains(&"writing".to_string()));
    }

    #[tokio::test]
    async fn test_concurrent_chat_on_same_session_rejected() {
        let assistant = test_assistant();
        assistant.sessions.create_or_get("s-1", "w-0").await;
        let held = assistant.sessions.acquire("s-1").await.unwrap();

        let mut request = ChatRequest::new("anything");
        request.session_id = Some("s-1".to_string());
        let err = assistant.chat(&request).await.unwrap_err();
        assert!(matches!(err, AppError::SessionBusy { .. }));

        drop(held);
        assert!(assistant.chat(&request).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_collection_requires_sentinel() {
        let assistant = test_assistant();
        assistant
            .ingest_document(&file("doc.txt", "some content"), &IngestOptions::default())
            .await;

        let err = assistant.delete_collection("yes please").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidConfirmation { .. }));
        assert_eq!(assistant.collection_stats().await.unwrap().total_chunks, 1);

        let removed = assistant.delete_collection("DELETE_ALL").await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(assistant.collection_stats().await.unwrap().total_chunks, 0);
    }

    #[tokio::test]
    async fn test_search_facade() {
        let assistant = test_assistant();
        assistant
            .ingest_document(&file("doc.txt", "alpha beta gamma"), &IngestOptions::default())
            .await;

        let response = assistant
            .search(&SearchRequest::new("alpha"))
            .await
            .unwrap();
        assert_eq!(response.total_found, 1);
    }

    #[tokio::test]
    async fn test_clear_session() {
        let assistant = test_assistant();
        let mut request = ChatRequest::new("hello");
        request.session_id = Some("s-9".to_string());
        assistant.chat(&request).await.unwrap();

        assert!(assistant.clear_session("s-9").await);
        assert!(!assistant.clear_session("s-9").await);
    }

    #[tokio::test]
    async fn test_health_report() {
        let assistant = test_assistant();
        let report = assistant.health().await;
        // Mock generator reports degraded, which dominates
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.components.len(), 3);
    }
}
