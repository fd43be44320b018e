//! Audit-related error types.

use thiserror::Error;

/// Errors that can occur while recording audit entries or statistics.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Underlying file I/O failed.
    #[error("audit io error: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Storage backend error (lock poisoned, sink closed, etc.).
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
