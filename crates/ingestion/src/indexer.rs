//! Chunk indexer
//!
//! Drives the ingestion pipeline for one document: extract, chunk, embed,
//! upsert. Batch ingestion isolates failures per document so one bad file
//! never poisons the rest of the batch.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use cognita_common::config::ChunkingConfig;
use cognita_common::embeddings::Embedder;
use cognita_common::errors::Result;
use cognita_common::models::{
    BatchIngestionRequest, BatchIngestionResult, Document, IngestFile, IngestOptions,
    IngestionResult, RecordMetadata, VectorRecord,
};
use cognita_retrieval::store::VectorStore;
use sha2::{Digest, Sha256};

use crate::chunker::chunk_text;
use crate::extract::extract_text;

/// Ingests documents into the vector store.
pub struct ChunkIndexer {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    config: ChunkingConfig,
}

impl ChunkIndexer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        config: ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Ingest a single document. Errors are captured in the result rather
    /// than propagated, so callers always get a per-document outcome.
    pub async fn ingest(&self, file: &IngestFile, options: &IngestOptions) -> IngestionResult {
        let start = Instant::now();
        match self.try_ingest(file, options).await {
            Ok(chunks_created) => IngestionResult {
                filename: file.filename.clone(),
                chunks_created,
                processing_time: start.elapsed().as_secs_f64(),
                file_size: file.bytes.len(),
                success: true,
                error: None,
            },
            Err(e) => {
                tracing::warn!(filename = %file.filename, error = %e, "Ingestion failed");
                IngestionResult::failed(&file.filename, file.bytes.len(), e.to_string())
            }
        }
    }

    async fn try_ingest(&self, file: &IngestFile, options: &IngestOptions) -> Result<usize> {
        let text = extract_text(&file.filename, &file.bytes, self.config.max_file_size)?;
        let document = Document::new(&file.filename, text, file.bytes.len());

        let chunks = chunk_text(
            &document.filename,
            &document.text,
            options.chunk_size,
            options.chunk_overlap,
        )?;
        if chunks.is_empty() {
            return Ok(0);
        }

        let digest = hex::encode(Sha256::digest(document.text.as_bytes()));

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let records: Vec<VectorRecord> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                let mut extra: BTreeMap<String, String> = options.metadata.clone();
                extra.insert("document_sha256".to_string(), digest.clone());
                VectorRecord {
                    chunk_id: chunk.chunk_id,
                    embedding,
                    content: chunk.text,
                    metadata: RecordMetadata {
                        filename: Some(chunk.filename),
                        position: Some(chunk.index),
                        extra,
                    },
                }
            })
            .collect();

        let count = records.len();
        self.store.upsert(records).await?;

        tracing::info!(
            filename = %file.filename,
            chunks = count,
            "Document indexed"
        );
        Ok(count)
    }

    /// Ingest a batch of documents.
    ///
    /// With `parallel_processing` the documents are processed concurrently;
    /// either way results come back in submission order and a failure in one
    /// document does not affect the others.
    pub async fn ingest_batch(&self, request: &BatchIngestionRequest) -> BatchIngestionResult {
        let start = Instant::now();

        let results = if request.parallel_processing {
            let futures = request
                .files
                .iter()
                .map(|file| self.ingest(file, &request.options));
            futures::future::join_all(futures).await
        } else {
            let mut results = Vec::with_capacity(request.files.len());
            for file in &request.files {
                results.push(self.ingest(file, &request.options).await);
            }
            results
        };

        BatchIngestionResult::from_results(results, start.elapsed().as_secs_f64())
    }
}
