//! Error types for reconciliation.

use thiserror::Error;

/// Errors that abort a reconciliation.
///
/// Per-entry failures never show up here; they are quarantined instead.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A per-channel task panicked or was cancelled.
    #[error("reconciliation task failed: {0}")]
    Task(String),
}

impl From<tokio::task::JoinError> for ReconcileError {
    fn from(e: tokio::task::JoinError) -> Self {
        ReconcileError::Task(e.to_string())
    }
}

/// Result type for reconciliation.
pub type Result<T> = std::result::Result<T, ReconcileError>;
