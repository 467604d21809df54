//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent hierarchy violations and bad input.
/// These are independent of CLI concerns.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("invalid records file {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    #[error("duplicate record id: {0}")]
    DuplicateId(String),

    #[error("cycle detected in hierarchy at id: {0}")]
    CycleDetected(String),
}

/// Result type for hierarchy operations.
pub type TreeResult<T> = Result<T, DomainError>;
