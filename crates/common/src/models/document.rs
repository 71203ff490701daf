//! Documents, chunks and vector records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An uploaded document, immutable once indexed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Original filename, doubles as the document id
    pub filename: String,

    /// Extracted plain text
    pub text: String,

    /// Size of the original upload in bytes
    pub size_bytes: usize,

    /// Upload timestamp
    pub uploaded_at: DateTime<Utc>,
}

impl Document {
    pub fn new(filename: impl Into<String>, text: impl Into<String>, size_bytes: usize) -> Self {
        Self {
            filename: filename.into(),
            text: text.into(),
            size_bytes,
            uploaded_at: Utc::now(),
        }
    }
}

/// A bounded contiguous span of a document's text.
///
/// For chunk size `S` and overlap `O` (0 <= O < S), adjacent chunks overlap
/// by exactly `O` characters; the final chunk may be shorter than `S`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable id: `{filename}_chunk_{index}`
    pub chunk_id: String,

    /// Parent document filename
    pub filename: String,

    /// Ordinal position within the document
    pub index: usize,

    /// Chunk text
    pub text: String,

    /// Start character offset in the extracted text
    pub start_char: usize,

    /// End character offset (exclusive)
    pub end_char: usize,
}

impl Chunk {
    /// Character length of the chunk span
    pub fn len(&self) -> usize {
        self.end_char - self.start_char
    }

    pub fn is_empty(&self) -> bool {
        self.start_char == self.end_char
    }
}

/// Typed metadata attached to vector records and retrieved passages.
///
/// Well-known keys (filename, position) are first-class fields; anything
/// source-specific goes into the open extension map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    /// Source document filename (internal sources)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Chunk position within the source document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,

    /// Open extension map for source-specific data (url, digest, tags)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl RecordMetadata {
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A chunk plus its embedding, as stored in the vector store.
///
/// All vectors within one store share dimension and distance metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Chunk id this record belongs to
    pub chunk_id: String,

    /// Embedding vector (fixed dimension per store)
    pub embedding: Vec<f32>,

    /// Chunk content
    pub content: String,

    /// Record metadata
    pub metadata: RecordMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_len() {
        let chunk = Chunk {
            chunk_id: "a.txt_chunk_0".into(),
            filename: "a.txt".into(),
            index: 0,
            text: "hello".into(),
            start_char: 0,
            end_char: 5,
        };
        assert_eq!(chunk.len(), 5);
        assert!(!chunk.is_empty());
    }

    #[test]
    fn test_metadata_extension_map() {
        let meta = RecordMetadata::default()
            .with_extra("url", "https://example.com")
            .with_extra("digest", "abc123");
        assert_eq!(meta.extra.get("url").map(String::as_str), Some("https://example.com"));
        assert!(meta.filename.is_none());
    }
}
