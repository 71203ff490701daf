//! Chat request/response envelope and workflow metadata

use serde::{Deserialize, Serialize};

use super::citation::Citation;

/// Request for the chat operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// User query or question
    pub query: String,

    /// Session id for conversation tracking
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Maximum documents to retrieve
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    /// Include external search in research
    #[serde(default = "default_include_web_search")]
    pub include_web_search: bool,

    /// Writing style preferences
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_preferences: Option<StylePreferences>,
}

fn default_max_documents() -> usize {
    5
}

fn default_include_web_search() -> bool {
    true
}

impl ChatRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            session_id: None,
            max_documents: default_max_documents(),
            include_web_search: default_include_web_search(),
            style_preferences: None,
        }
    }
}

/// Writing style preferences for the writer stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StylePreferences {
    /// Tone of voice, e.g. "professional"
    #[serde(default = "default_tone")]
    pub tone: String,

    /// Target length: short, medium, long
    #[serde(default = "default_length")]
    pub length: String,

    /// Target audience, e.g. "general"
    #[serde(default = "default_audience")]
    pub audience: String,
}

fn default_tone() -> String {
    "professional".to_string()
}

fn default_length() -> String {
    "medium".to_string()
}

fn default_audience() -> String {
    "general".to_string()
}

impl Default for StylePreferences {
    fn default() -> Self {
        Self {
            tone: default_tone(),
            length: default_length(),
            audience: default_audience(),
        }
    }
}

/// Workflow execution metadata attached to a chat response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    /// Unique workflow identifier
    pub workflow_id: String,

    /// Processing time in seconds
    pub processing_time: f64,

    /// Stages that actually completed; may contain gaps when a stage
    /// degraded or was skipped
    pub steps_completed: Vec<String>,

    /// Number of sources used
    pub sources_used: usize,

    /// Answer quality score (0-100)
    pub quality_score: u8,
}

/// Response for the chat operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Original query
    pub query: String,

    /// Generated answer
    pub answer: String,

    /// Citations in first-use order
    pub citations: Vec<Citation>,

    /// Workflow metadata
    pub metadata: WorkflowMetadata,

    /// Error message when the writing stage failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Whether a usable answer was produced
    pub success: bool,
}
