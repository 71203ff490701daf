//! Workflow stage processors
//!
//! Each stage is a processor with a typed output. The orchestrator owns
//! retries, timeouts and degradation; stages only do the work.

use cognita_common::models::{Citation, RetrievedPassage, StylePreferences};

pub mod reasoning;
pub mod research;
pub mod writer;

pub use reasoning::ReasoningStage;
pub use research::ResearchStage;
pub use writer::WriterStage;

/// Immutable per-query context shared by all stages
#[derive(Debug, Clone)]
pub struct StageContext {
    /// The user query
    pub query: String,

    /// Maximum internal documents to retrieve
    pub max_documents: usize,

    /// Whether the research stage consults the external searcher
    pub include_web_search: bool,

    /// Writing style preferences
    pub style: StylePreferences,
}

/// Output of the research stage
#[derive(Debug, Clone)]
pub struct ResearchOutput {
    /// Merged, deduplicated evidence in descending score order
    pub evidence: Vec<RetrievedPassage>,

    /// Short extractive summary of the evidence
    pub summary: String,
}

/// Output of the writer stage
#[derive(Debug, Clone)]
pub struct WriterOutput {
    /// The answer body, including a Sources section when cited
    pub answer: String,

    /// Citations in first-use order
    pub citations: Vec<Citation>,
}
