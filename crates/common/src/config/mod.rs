//! Configuration management for Cognita
//!
//! Supports loading configuration from:
//! - `.env` files (via dotenvy)
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/<env>.toml)
//! - Default values
//!
//! Retry counts, backoff, timeouts and TTLs are explicit fields rather
//! than constants buried in the orchestrator.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::Result;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Embedding capability configuration
    pub embedding: EmbeddingConfig,

    /// Text-generation capability configuration
    pub generation: GenerationConfig,

    /// Document chunking configuration
    pub chunking: ChunkingConfig,

    /// Retrieval engine configuration
    pub retrieval: RetrievalConfig,

    /// Workflow orchestration configuration
    pub workflow: WorkflowConfig,

    /// External web search configuration
    pub web_search: WebSearchConfig,

    /// Observability configuration
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmbeddingConfig {
    /// Embedding provider: openai, mock
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// API key for embedding service
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// Maximum retries per remote call
    #[serde(default = "default_embedding_retries")]
    pub max_retries: u32,

    /// Batch size for embedding requests
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// API endpoint for the text-generation service
    #[serde(default = "default_generation_endpoint")]
    pub endpoint: String,

    /// API key (empty selects the deterministic mock)
    #[serde(default)]
    pub api_key: String,

    /// Model name
    #[serde(default = "default_generation_model")]
    pub model: String,

    /// Maximum output tokens
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Overlap between adjacent chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Maximum accepted input file size in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    /// Default number of passages to retrieve
    #[serde(default = "default_max_documents")]
    pub max_documents: usize,

    /// Minimum similarity score to keep a passage (0.0 keeps everything)
    #[serde(default)]
    pub min_score: f32,

    /// Maximum attempts for embedding/search calls
    #[serde(default = "default_retrieval_retries")]
    pub max_retries: u32,

    /// Base backoff between retrieval attempts in milliseconds
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Maximum retries per stage before degrading or failing
    #[serde(default = "default_max_stage_retries")]
    pub max_stage_retries: u32,

    /// Base backoff between stage retries in milliseconds (doubled per attempt)
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Timeout for a single stage attempt in seconds
    #[serde(default = "default_stage_timeout")]
    pub stage_timeout_secs: u64,

    /// Session time-to-live in seconds
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebSearchConfig {
    /// Enable the external search collaborator
    #[serde(default)]
    pub enabled: bool,

    /// Timeout for one external search call in seconds
    #[serde(default = "default_web_search_timeout")]
    pub timeout_secs: u64,

    /// Maximum external results to merge per query
    #[serde(default = "default_web_search_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Service name for tracing
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_embedding_provider() -> String { "openai".to_string() }
fn default_embedding_model() -> String { "text-embedding-3-small".to_string() }
fn default_embedding_dimension() -> usize { 384 }
fn default_embedding_timeout() -> u64 { 30 }
fn default_embedding_retries() -> u32 { 3 }
fn default_batch_size() -> usize { 32 }
fn default_generation_endpoint() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_generation_model() -> String { "gpt-4o-mini".to_string() }
fn default_max_tokens() -> usize { 1500 }
fn default_temperature() -> f32 { 0.4 }
fn default_generation_timeout() -> u64 { 30 }
fn default_chunk_size() -> usize { 1000 }
fn default_chunk_overlap() -> usize { 200 }
fn default_max_file_size() -> usize { 10 * 1024 * 1024 }
fn default_max_documents() -> usize { 5 }
fn default_retrieval_retries() -> u32 { 3 }
fn default_retry_backoff_ms() -> u64 { 200 }
fn default_max_stage_retries() -> u32 { 2 }
fn default_stage_timeout() -> u64 { 30 }
fn default_session_ttl() -> u64 { 3600 }
fn default_web_search_timeout() -> u64 { 10 }
fn default_web_search_results() -> usize { 3 }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_service_name() -> String { "cognita".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        // Pull in .env before reading APP_ENV or the APP__ overrides
        dotenvy::dotenv().ok();

        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))
            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            // Load local overrides
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables with APP__ prefix
            // e.g., APP__EMBEDDING__DIMENSION=768
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Get stage timeout as Duration
    pub fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.workflow.stage_timeout_secs)
    }

    /// Get session TTL as Duration
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.workflow.session_ttl_secs)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            embedding: EmbeddingConfig {
                provider: default_embedding_provider(),
                api_key: None,
                api_base: None,
                model: default_embedding_model(),
                dimension: default_embedding_dimension(),
                timeout_secs: default_embedding_timeout(),
                max_retries: default_embedding_retries(),
                batch_size: default_batch_size(),
            },
            generation: GenerationConfig {
                endpoint: default_generation_endpoint(),
                api_key: String::new(),
                model: default_generation_model(),
                max_tokens: default_max_tokens(),
                temperature: default_temperature(),
                timeout_secs: default_generation_timeout(),
            },
            chunking: ChunkingConfig {
                chunk_size: default_chunk_size(),
                chunk_overlap: default_chunk_overlap(),
                max_file_size: default_max_file_size(),
            },
            retrieval: RetrievalConfig {
                max_documents: default_max_documents(),
                min_score: 0.0,
                max_retries: default_retrieval_retries(),
                retry_backoff_ms: default_retry_backoff_ms(),
            },
            workflow: WorkflowConfig {
                max_stage_retries: default_max_stage_retries(),
                retry_backoff_ms: default_retry_backoff_ms(),
                stage_timeout_secs: default_stage_timeout(),
                session_ttl_secs: default_session_ttl(),
            },
            web_search: WebSearchConfig {
                enabled: false,
                timeout_secs: default_web_search_timeout(),
                max_results: default_web_search_results(),
            },
            observability: ObservabilityConfig {
                log_level: default_log_level(),
                json_logging: default_json_logging(),
                service_name: default_service_name(),
            },
        }
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_stage_retries: default_max_stage_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            stage_timeout_secs: default_stage_timeout(),
            session_ttl_secs: default_session_ttl(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_documents: default_max_documents(),
            min_score: 0.0,
            max_retries: default_retrieval_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            max_file_size: default_max_file_size(),
        }
    }
}
