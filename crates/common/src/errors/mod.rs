//! Error types for the Cognita engine
//!
//! Provides a comprehensive error handling system with:
//! - Distinct error types for different failure modes
//! - Error codes for machine-readable identification
//! - Retryability classification used by bounded-retry loops

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

/// Error codes for machine-readable error identification
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors (1xxx)
    ValidationError,
    InvalidConfirmation,

    // Configuration errors (2xxx)
    ConfigError,
    DimensionMismatch,

    // Ingestion errors (3xxx)
    IngestionError,
    UnsupportedFileType,
    FileTooLarge,

    // Retrieval errors (4xxx)
    RetrievalError,
    EmbeddingError,
    EmbeddingTimeout,

    // Workflow errors (5xxx)
    StageError,
    GenerationError,
    SessionBusy,
    SessionNotFound,

    // Internal errors (9xxx)
    InternalError,
    SerializationError,
    UpstreamError,
}

impl ErrorCode {
    /// Get the numeric code for this error
    pub fn as_code(&self) -> u16 {
        match self {
            // Validation (1xxx)
            ErrorCode::ValidationError => 1001,
            ErrorCode::InvalidConfirmation => 1002,

            // Configuration (2xxx)
            ErrorCode::ConfigError => 2001,
            ErrorCode::DimensionMismatch => 2002,

            // Ingestion (3xxx)
            ErrorCode::IngestionError => 3001,
            ErrorCode::UnsupportedFileType => 3002,
            ErrorCode::FileTooLarge => 3003,

            // Retrieval (4xxx)
            ErrorCode::RetrievalError => 4001,
            ErrorCode::EmbeddingError => 4002,
            ErrorCode::EmbeddingTimeout => 4003,

            // Workflow (5xxx)
            ErrorCode::StageError => 5001,
            ErrorCode::GenerationError => 5002,
            ErrorCode::SessionBusy => 5003,
            ErrorCode::SessionNotFound => 5004,

            // Internal (9xxx)
            ErrorCode::InternalError => 9001,
            ErrorCode::SerializationError => 9002,
            ErrorCode::UpstreamError => 9003,
        }
    }
}

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Invalid confirmation token: expected '{expected}'")]
    InvalidConfirmation { expected: String },

    // Configuration errors (fatal, never retried)
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Ingestion errors (recorded per document, never abort a batch)
    #[error("Ingestion failed for '{filename}': {message}")]
    Ingestion { filename: String, message: String },

    #[error("Unsupported file type: {extension}")]
    UnsupportedFileType { extension: String },

    #[error("File too large: {size} bytes exceeds limit of {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    // Retrieval errors
    #[error("Retrieval failed: {message}")]
    Retrieval { message: String },

    #[error("Embedding service error: {message}")]
    Embedding { message: String },

    #[error("Embedding timeout after {timeout_ms}ms")]
    EmbeddingTimeout { timeout_ms: u64 },

    // Workflow errors
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    #[error("Generation service error: {message}")]
    Generation { message: String },

    #[error("Session '{id}' already has a workflow in flight")]
    SessionBusy { id: String },

    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    // Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Generic
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Get the error code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::InvalidConfirmation { .. } => ErrorCode::InvalidConfirmation,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::DimensionMismatch { .. } => ErrorCode::DimensionMismatch,
            AppError::Ingestion { .. } => ErrorCode::IngestionError,
            AppError::UnsupportedFileType { .. } => ErrorCode::UnsupportedFileType,
            AppError::FileTooLarge { .. } => ErrorCode::FileTooLarge,
            AppError::Retrieval { .. } => ErrorCode::RetrievalError,
            AppError::Embedding { .. } => ErrorCode::EmbeddingError,
            AppError::EmbeddingTimeout { .. } => ErrorCode::EmbeddingTimeout,
            AppError::Stage { .. } => ErrorCode::StageError,
            AppError::Generation { .. } => ErrorCode::GenerationError,
            AppError::SessionBusy { .. } => ErrorCode::SessionBusy,
            AppError::SessionNotFound { .. } => ErrorCode::SessionNotFound,
            AppError::Internal { .. } => ErrorCode::InternalError,
            AppError::Serialization(_) => ErrorCode::SerializationError,
            AppError::HttpClient(_) => ErrorCode::UpstreamError,
            AppError::Other(_) => ErrorCode::InternalError,
        }
    }

    /// Whether a bounded-retry loop may retry this error.
    ///
    /// Configuration and validation problems are permanent; transient
    /// service failures (embedding, generation, retrieval, upstream HTTP)
    /// are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Validation { .. }
            | AppError::InvalidConfirmation { .. }
            | AppError::Config { .. }
            | AppError::DimensionMismatch { .. }
            | AppError::UnsupportedFileType { .. }
            | AppError::FileTooLarge { .. }
            | AppError::SessionBusy { .. }
            | AppError::SessionNotFound { .. }
            | AppError::Serialization(_) => false,

            AppError::Ingestion { .. }
            | AppError::Retrieval { .. }
            | AppError::Embedding { .. }
            | AppError::EmbeddingTimeout { .. }
            | AppError::Stage { .. }
            | AppError::Generation { .. }
            | AppError::HttpClient(_)
            | AppError::Internal { .. }
            | AppError::Other(_) => true,
        }
    }

    /// Convenience constructor for stage failures
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        let err = AppError::DimensionMismatch {
            expected: 768,
            actual: 384,
        };
        assert_eq!(err.code(), ErrorCode::DimensionMismatch);
        assert_eq!(err.code().as_code(), 2002);
    }

    #[test]
    fn test_config_errors_are_not_retryable() {
        let err = AppError::Config {
            message: "chunk_overlap must be smaller than chunk_size".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_embedding_errors_are_retryable() {
        let err = AppError::Embedding {
            message: "connection reset".into(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_session_busy_message() {
        let err = AppError::SessionBusy { id: "s-1".into() };
        assert!(err.to_string().contains("s-1"));
        assert!(!err.is_retryable());
    }
}
