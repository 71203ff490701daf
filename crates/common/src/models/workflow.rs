//! Workflow state machine data
//!
//! The orchestrator owns the transition logic; this module holds the state
//! that is persisted per session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::passage::RetrievedPassage;

/// Named states of the workflow state machine
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStage {
    Init,
    Researching,
    Reasoning,
    Writing,
    Succeeded,
    Failed,
}

impl WorkflowStage {
    /// Stage name as recorded in `steps_completed`
    pub fn step_name(&self) -> &'static str {
        match self {
            WorkflowStage::Init => "init",
            WorkflowStage::Researching => "research",
            WorkflowStage::Reasoning => "reasoning",
            WorkflowStage::Writing => "writing",
            WorkflowStage::Succeeded => "succeeded",
            WorkflowStage::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStage::Succeeded | WorkflowStage::Failed)
    }
}

/// Terminal status of a workflow
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Running,
    Succeeded,
    Failed,
}

/// A structured insight extracted from one piece of evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Insight {
    /// The insight text
    pub text: String,

    /// Chunk id of the supporting evidence, if internal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_chunk_id: Option<String>,

    /// Confidence in this insight (0.0 - 1.0)
    pub confidence: f32,
}

/// Output of the reasoning stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningOutput {
    /// Decomposed sub-questions (best-effort heuristic)
    pub sub_questions: Vec<String>,

    /// Structured insights per evidence item
    pub insights: Vec<Insight>,

    /// Overall reasoning confidence (0.0 - 1.0)
    pub confidence: f32,
}

/// Per-session workflow state.
///
/// Created on the first query in a session, mutated only by the
/// orchestrator, deleted on explicit clear or TTL expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    /// Owning session id
    pub session_id: String,

    /// Workflow id for the current/most recent run
    pub workflow_id: String,

    /// Current stage
    pub stage: WorkflowStage,

    /// Terminal status
    pub status: WorkflowStatus,

    /// Accumulated evidence, in merged rank order
    pub evidence: Vec<RetrievedPassage>,

    /// Research summary, when the research stage completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research_summary: Option<String>,

    /// Reasoning output, when the reasoning stage completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<ReasoningOutput>,

    /// Stages that actually completed, in order
    pub steps_completed: Vec<String>,

    /// Retry counter for the stage currently being attempted
    pub current_stage_retries: u32,

    /// Error carried into the failed terminal state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Workflow start time
    pub started_at: DateTime<Utc>,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl WorkflowState {
    pub fn new(session_id: impl Into<String>, workflow_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            workflow_id: workflow_id.into(),
            stage: WorkflowStage::Init,
            status: WorkflowStatus::Running,
            evidence: Vec::new(),
            research_summary: None,
            reasoning: None,
            steps_completed: Vec::new(),
            current_stage_retries: 0,
            error: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Move to a new stage, resetting the per-stage retry counter
    pub fn enter_stage(&mut self, stage: WorkflowStage) {
        self.stage = stage;
        self.current_stage_retries = 0;
        self.updated_at = Utc::now();
    }

    /// Record that a stage completed
    pub fn complete_step(&mut self, stage: WorkflowStage) {
        self.steps_completed.push(stage.step_name().to_string());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_stages() {
        assert!(WorkflowStage::Succeeded.is_terminal());
        assert!(WorkflowStage::Failed.is_terminal());
        assert!(!WorkflowStage::Researching.is_terminal());
    }

    #[test]
    fn test_enter_stage_resets_retries() {
        let mut state = WorkflowState::new("s-1", "w-1");
        state.current_stage_retries = 2;
        state.enter_stage(WorkflowStage::Reasoning);
        assert_eq!(state.current_stage_retries, 0);
        assert_eq!(state.stage, WorkflowStage::Reasoning);
    }
}
