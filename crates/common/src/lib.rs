//! Cognita Common Library
//!
//! Shared code for all Cognita crates including:
//! - Domain and wire models
//! - Embedding and generation client abstractions
//! - Citation tracking
//! - Session storage
//! - Error types and handling
//! - Configuration management

pub mod citations;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod generation;
pub mod models;
pub mod session;

// Re-export commonly used types
pub use citations::CitationTracker;
pub use config::AppConfig;
pub use embeddings::Embedder;
pub use errors::{AppError, Result};
pub use generation::Generator;
pub use session::SessionStore;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default embedding dimension
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;
