//! Citation tracking
//!
//! One tracker lives per answer. It deduplicates sources, hands out 1-based
//! ids in first-use order, and produces the ordered citation list that goes
//! out with the response.

use std::collections::BTreeMap;

use crate::models::{Citation, RetrievedPassage, SourceType};

/// Tracks citations for a single answer.
///
/// Citing the same source twice returns the same id; ids are assigned in
/// first-use order starting at 1. Internal passages are keyed by chunk id,
/// external results by their normalized URL (carried as `chunk_id`).
#[derive(Debug, Default)]
pub struct CitationTracker {
    citations: Vec<Citation>,
}

impl CitationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a passage as cited and return its citation id.
    ///
    /// Idempotent per source: repeat calls for the same chunk id or URL
    /// return the id assigned on first use.
    pub fn cite(&mut self, passage: &RetrievedPassage) -> usize {
        if let Some(existing) = self
            .citations
            .iter()
            .find(|c| c.citation_info.get("source_key").map(String::as_str) == Some(&passage.chunk_id))
        {
            return existing.id;
        }

        let id = self.citations.len() + 1;

        let mut info = BTreeMap::new();
        info.insert("source_key".to_string(), passage.chunk_id.clone());
        match passage.source_type {
            SourceType::InternalDocument => {
                info.insert("chunk_id".to_string(), passage.chunk_id.clone());
                if let Some(filename) = &passage.metadata.filename {
                    info.insert("filename".to_string(), filename.clone());
                }
            }
            SourceType::ExternalSearch => {
                info.insert("url".to_string(), passage.chunk_id.clone());
            }
        }

        self.citations.push(Citation {
            id,
            title: passage.title.clone(),
            source_type: passage.source_type,
            relevance_score: passage.score,
            citation_info: info,
            in_text_reference: format!("[{}]", id),
        });

        id
    }

    /// All citations, ordered by id
    pub fn citations(&self) -> &[Citation] {
        &self.citations
    }

    /// Consume the tracker, yielding the ordered citation list
    pub fn into_citations(self) -> Vec<Citation> {
        self.citations
    }

    /// Number of distinct cited sources
    pub fn len(&self) -> usize {
        self.citations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.citations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordMetadata;

    fn passage(chunk_id: &str, title: &str, source_type: SourceType) -> RetrievedPassage {
        RetrievedPassage {
            chunk_id: chunk_id.to_string(),
            content: "content".to_string(),
            score: 0.8,
            source_type,
            title: title.to_string(),
            metadata: RecordMetadata {
                filename: Some("paper.txt".to_string()),
                position: Some(0),
                extra: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn test_ids_assigned_in_first_use_order() {
        let mut tracker = CitationTracker::new();
        let a = tracker.cite(&passage("paper.txt_chunk_0", "Paper", SourceType::InternalDocument));
        let b = tracker.cite(&passage("paper.txt_chunk_1", "Paper", SourceType::InternalDocument));
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(tracker.citations()[0].in_text_reference, "[1]");
    }

    #[test]
    fn test_cite_is_idempotent_per_source() {
        let mut tracker = CitationTracker::new();
        let p = passage("paper.txt_chunk_0", "Paper", SourceType::InternalDocument);
        let first = tracker.cite(&p);
        let second = tracker.cite(&p);
        assert_eq!(first, second);
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_external_citation_records_url() {
        let mut tracker = CitationTracker::new();
        tracker.cite(&passage(
            "https://example.org/page",
            "Example page",
            SourceType::ExternalSearch,
        ));
        let citation = &tracker.citations()[0];
        assert_eq!(
            citation.citation_info.get("url").map(String::as_str),
            Some("https://example.org/page")
        );
        assert!(citation.citation_info.get("chunk_id").is_none());
    }
}
