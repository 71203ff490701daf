//! Cognita Workflow
//!
//! Research workflow orchestration:
//! - `stages`: research, reasoning and writer processors
//! - `orchestrator`: the state machine with retry, timeout and degradation
//! - `websearch`: the external search boundary
//! - `service`: the assistant facade over ingestion, retrieval and workflow
//! - `telemetry`: tracing initialization

pub mod orchestrator;
pub mod service;
pub mod stages;
pub mod telemetry;
pub mod websearch;

pub use orchestrator::WorkflowOrchestrator;
pub use service::Assistant;
pub use websearch::WebSearcher;
