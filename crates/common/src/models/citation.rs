//! Per-answer citation model

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::passage::SourceType;

/// A structured reference binding an answer's in-text marker to a source.
///
/// Ids are unique within one answer, assigned in first-use order starting
/// at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Numeric citation id (1-based, per answer)
    pub id: usize,

    /// Source title
    pub title: String,

    /// Source classification
    pub source_type: SourceType,

    /// Relevance score of the underlying passage
    pub relevance_score: f32,

    /// Detailed citation information (filename, chunk_id, url)
    pub citation_info: BTreeMap<String, String>,

    /// Literal in-text marker used in the answer body, e.g. "[1]"
    pub in_text_reference: String,
}
