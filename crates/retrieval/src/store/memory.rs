//! In-memory vector store
//!
//! Brute-force cosine similarity over a flat record list. Embeddings are
//! L2-normalized on insert so a search is a single dot product per record.

use std::collections::HashSet;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cognita_common::errors::{AppError, Result};
use cognita_common::models::{CollectionStats, RetrievedPassage, SourceType, VectorRecord};

use super::VectorStore;

struct StoredRecord {
    record: VectorRecord,
    /// Normalized copy of the embedding, used for scoring
    unit: Vec<f32>,
}

/// Flat in-memory vector store.
///
/// Records are kept in insertion order; equal-score search results preserve
/// that order, which keeps result ordering deterministic.
pub struct InMemoryVectorStore {
    records: RwLock<Vec<StoredRecord>>,
    dimension: usize,
    last_updated: RwLock<DateTime<Utc>>,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize) -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            dimension,
            last_updated: RwLock::new(Utc::now()),
        }
    }

    fn normalize(embedding: &[f32]) -> Vec<f32> {
        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter().map(|v| v / norm).collect()
        } else {
            embedding.to_vec()
        }
    }

    fn touch(&self) {
        if let Ok(mut ts) = self.last_updated.write() {
            *ts = Utc::now();
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<()> {
        // Validate the whole batch before touching the store
        for record in &records {
            if record.embedding.len() != self.dimension {
                return Err(AppError::DimensionMismatch {
                    expected: self.dimension,
                    actual: record.embedding.len(),
                });
            }
        }

        let mut stored = self
            .records
            .write()
            .map_err(|_| AppError::Internal {
                message: "vector store lock poisoned".to_string(),
            })?;

        for record in records {
            let unit = Self::normalize(&record.embedding);
            match stored.iter_mut().find(|s| s.record.chunk_id == record.chunk_id) {
                Some(existing) => {
                    existing.record = record;
                    existing.unit = unit;
                }
                None => stored.push(StoredRecord { record, unit }),
            }
        }
        drop(stored);

        self.touch();
        Ok(())
    }

    async fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedPassage>> {
        if query.len() != self.dimension {
            return Err(AppError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let unit_query = Self::normalize(query);

        let stored = self
            .records
            .read()
            .map_err(|_| AppError::Internal {
                message: "vector store lock poisoned".to_string(),
            })?;

        let mut scored: Vec<RetrievedPassage> = stored
            .iter()
            .map(|s| {
                let score: f32 = s
                    .unit
                    .iter()
                    .zip(unit_query.iter())
                    .map(|(a, b)| a * b)
                    .sum();
                RetrievedPassage {
                    chunk_id: s.record.chunk_id.clone(),
                    content: s.record.content.clone(),
                    score,
                    source_type: SourceType::InternalDocument,
                    title: s
                        .record
                        .metadata
                        .filename
                        .clone()
                        .unwrap_or_else(|| s.record.chunk_id.clone()),
                    metadata: s.record.metadata.clone(),
                }
            })
            .collect();

        // Stable sort keeps insertion order on score ties
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut stored = self
            .records
            .write()
            .map_err(|_| AppError::Internal {
                message: "vector store lock poisoned".to_string(),
            })?;
        let removed = stored.len();
        stored.clear();
        drop(stored);

        self.touch();
        Ok(removed)
    }

    async fn stats(&self) -> Result<CollectionStats> {
        let stored = self
            .records
            .read()
            .map_err(|_| AppError::Internal {
                message: "vector store lock poisoned".to_string(),
            })?;

        let documents: HashSet<&str> = stored
            .iter()
            .filter_map(|s| s.record.metadata.filename.as_deref())
            .collect();

        let storage_size: usize = stored
            .iter()
            .map(|s| s.record.content.len() + s.record.embedding.len() * std::mem::size_of::<f32>())
            .sum();

        let last_updated = self
            .last_updated
            .read()
            .map(|ts| *ts)
            .unwrap_or_else(|_| Utc::now());

        Ok(CollectionStats {
            vector_store_type: "in_memory".to_string(),
            total_documents: documents.len(),
            total_chunks: stored.len(),
            storage_size: Some(storage_size),
            last_updated,
        })
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
