//! Error types for the askpdf CLI.
//!
//! This module defines a unified error enum covering all error categories
//! in the application: invalid caller input, missing bundles, corrupted
//! bundle artifacts, upstream embedding/LLM failures, and the ambient
//! configuration, I/O, and serialization errors.

use thiserror::Error;

/// Unified error type for the askpdf CLI.
///
/// All functions in the application return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid caller input (empty document, out-of-range page, bad k)
    #[error("Invalid input: {0}")]
    Input(String),

    /// A requested bundle has no persisted artifacts
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persisted artifacts disagree with each other or with the query
    #[error("Integrity error: {0}")]
    Integrity(String),

    /// PDF extraction errors
    #[error("Document error: {0}")]
    Document(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Text-generation provider errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
