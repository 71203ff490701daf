//! Workflow orchestrator
//!
//! Drives one query through the research, reasoning and writing stages.
//! The orchestrator owns retries, timeouts and degradation; a stage that
//! exhausts its retry budget before writing degrades the run rather than
//! failing it, and only a writing failure produces an unsuccessful
//! response.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cognita_common::config::WorkflowConfig;
use cognita_common::errors::{AppError, Result};
use cognita_common::models::{
    ChatRequest, ChatResponse, WorkflowMetadata, WorkflowStage, WorkflowState, WorkflowStatus,
};
use cognita_common::session::SessionStore;
use uuid::Uuid;

use crate::stages::{ReasoningStage, ResearchStage, StageContext, WriterStage};

const APOLOGY_ANSWER: &str =
    "I was unable to produce an answer for this query. Please try again.";

/// Quality threshold below which an answer is considered ungrounded
pub const QUALITY_THRESHOLD: u8 = 60;

pub struct WorkflowOrchestrator {
    research: ResearchStage,
    reasoning: ReasoningStage,
    writer: WriterStage,
    sessions: Arc<SessionStore>,
    config: WorkflowConfig,
}

impl WorkflowOrchestrator {
    pub fn new(
        research: ResearchStage,
        reasoning: ReasoningStage,
        writer: WriterStage,
        sessions: Arc<SessionStore>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            research,
            reasoning,
            writer,
            sessions,
            config,
        }
    }

    /// Run the full workflow for one chat request.
    ///
    /// A second call for the same session while a run is in flight fails
    /// fast with `SessionBusy`.
    pub async fn run(&self, request: &ChatRequest) -> Result<ChatResponse> {
        if request.query.trim().is_empty() {
            return Err(AppError::Validation {
                message: "query must not be empty".to_string(),
            });
        }

        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let workflow_id = Uuid::new_v4().to_string();

        self.sessions.create_or_get(&session_id, &workflow_id).await;
        let _guard = self.sessions.acquire(&session_id).await?;

        // Each query starts a fresh run on the session
        let mut state = WorkflowState::new(&session_id, &workflow_id);
        let started = Instant::now();

        let ctx = StageContext {
            query: request.query.clone(),
            max_documents: request.max_documents,
            include_web_search: request.include_web_search,
            style: request.style_preferences.clone().unwrap_or_default(),
        };

        tracing::info!(
            session_id = %session_id,
            workflow_id = %workflow_id,
            "Workflow started"
        );

        // Research: exhaustion degrades to writing with no evidence
        state.enter_stage(WorkflowStage::Researching);
        match self
            .retry_stage(WorkflowStage::Researching, || self.research.run(&ctx))
            .await
        {
            Ok(output) => {
                state.evidence = output.evidence;
                state.research_summary = Some(output.summary);
                state.complete_step(WorkflowStage::Researching);
            }
            Err(e) => {
                state.current_stage_retries = self.config.max_stage_retries;
                tracing::warn!(error = %e, "Research stage degraded");
            }
        }

        // Reasoning: exhaustion degrades to writing without insights
        state.enter_stage(WorkflowStage::Reasoning);
        let reasoned = self
            .retry_stage(WorkflowStage::Reasoning, || {
                self.reasoning.run(&ctx, &state.evidence)
            })
            .await;
        match reasoned {
            Ok(output) => {
                state.reasoning = Some(output);
                state.complete_step(WorkflowStage::Reasoning);
            }
            Err(e) => {
                state.current_stage_retries = self.config.max_stage_retries;
                tracing::warn!(error = %e, "Reasoning stage degraded");
            }
        }

        // Writing: exhaustion fails the workflow
        state.enter_stage(WorkflowStage::Writing);
        let written = self
            .retry_stage(WorkflowStage::Writing, || {
                self.writer.run(
                    &ctx,
                    &state.evidence,
                    state.research_summary.as_deref(),
                    state.reasoning.as_ref(),
                )
            })
            .await;

        let response = match written {
            Ok(output) => {
                state.complete_step(WorkflowStage::Writing);
                state.enter_stage(WorkflowStage::Succeeded);
                state.status = WorkflowStatus::Succeeded;

                let quality_score = compute_quality(
                    output.citations.len(),
                    state
                        .reasoning
                        .as_ref()
                        .map(|r| !r.insights.is_empty())
                        .unwrap_or(false),
                    !state.evidence.is_empty(),
                    !output.citations.is_empty(),
                );

                ChatResponse {
                    query: request.query.clone(),
                    answer: output.answer,
                    metadata: WorkflowMetadata {
                        workflow_id: workflow_id.clone(),
                        processing_time: started.elapsed().as_secs_f64(),
                        steps_completed: state.steps_completed.clone(),
                        sources_used: output.citations.len(),
                        quality_score,
                    },
                    citations: output.citations,
                    error: None,
                    success: true,
                }
            }
            Err(e) => {
                state.enter_stage(WorkflowStage::Failed);
                state.status = WorkflowStatus::Failed;
                state.error = Some(e.to_string());

                tracing::error!(
                    session_id = %session_id,
                    workflow_id = %workflow_id,
                    error = %e,
                    "Workflow failed in writing stage"
                );

                ChatResponse {
                    query: request.query.clone(),
                    answer: APOLOGY_ANSWER.to_string(),
                    citations: Vec::new(),
                    metadata: WorkflowMetadata {
                        workflow_id: workflow_id.clone(),
                        processing_time: started.elapsed().as_secs_f64(),
                        steps_completed: state.steps_completed.clone(),
                        sources_used: 0,
                        quality_score: 0,
                    },
                    error: Some(e.to_string()),
                    success: false,
                }
            }
        };

        if let Err(e) = self.sessions.update(state).await {
            match e {
                // Session was cleared or expired while the run was in
                // flight; the answer still goes back to the caller
                AppError::SessionNotFound { .. } => {
                    tracing::warn!(
                        session_id = %session_id,
                        "Session gone before persist, result not stored"
                    );
                }
                other => return Err(other),
            }
        }

        tracing::info!(
            session_id = %session_id,
            workflow_id = %workflow_id,
            success = response.success,
            quality = response.metadata.quality_score,
            "Workflow finished"
        );
        Ok(response)
    }

    /// Run one stage with bounded retry, backoff and a per-attempt timeout.
    ///
    /// A timed-out attempt counts against the retry budget like any other
    /// failure. Non-retryable errors exit immediately.
    async fn retry_stage<T, F, Fut>(&self, stage: WorkflowStage, run: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let timeout = Duration::from_secs(self.config.stage_timeout_secs);
        let mut last_error = None;

        for attempt in 0..=self.config.max_stage_retries {
            if attempt > 0 {
                let delay =
                    Duration::from_millis(self.config.retry_backoff_ms * 2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }

            match tokio::time::timeout(timeout, run()).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(e)) if !e.is_retryable() => return Err(e),
                Ok(Err(e)) => {
                    tracing::warn!(
                        stage = stage.step_name(),
                        attempt = attempt + 1,
                        error = %e,
                        "Stage attempt failed"
                    );
                    last_error = Some(e);
                }
                Err(_) => {
                    tracing::warn!(
                        stage = stage.step_name(),
                        attempt = attempt + 1,
                        "Stage attempt timed out"
                    );
                    last_error = Some(AppError::stage(stage.step_name(), "stage timed out"));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::stage(stage.step_name(), "retries exhausted")))
    }
}

/// Deterministic answer quality score in 0..=100.
///
/// Base 50, plus up to 15 for cited sources, 15 when reasoning yielded
/// insights, 10 when evidence went through the reranker, 10 when the
/// answer body carries in-text citations. An answer with zero sources
/// scores the bare base and stays below [`QUALITY_THRESHOLD`].
pub fn compute_quality(
    sources_used: usize,
    reasoning_has_insights: bool,
    evidence_reranked: bool,
    has_citations: bool,
) -> u8 {
    let mut score = 50u32;
    score += (2 * sources_used as u32).min(15);
    if reasoning_has_insights {
        score += 15;
    }
    if evidence_reranked {
        score += 10;
    }
    if has_citations {
        score += 10;
    }
    score.min(100) as u8
}
