//! Error types for the unified API.

use reqlogic_core::LogicError;
use reqlogic_log::LogError;
use reqlogic_reconcile::ReconcileError;
use thiserror::Error;

/// Errors that can occur during RequestLogic operations.
#[derive(Debug, Error)]
pub enum RequestLogicError {
    /// The action was rejected by the request logic.
    #[error("{0}")]
    Logic(#[from] LogicError),

    /// Transaction log error.
    #[error("transaction log error: {0}")]
    Log(#[from] LogError),

    /// Reconciliation error.
    #[error("reconciliation error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// An action must be signed but no provider was configured.
    #[error("no signature provider given")]
    NoSignatureProvider,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl RequestLogicError {
    /// The underlying request logic error, if any.
    pub fn as_logic(&self) -> Option<&LogicError> {
        match self {
            RequestLogicError::Logic(e) => Some(e),
            _ => None,
        }
    }
}

/// Result type for RequestLogic operations.
pub type Result<T> = std::result::Result<T, RequestLogicError>;
