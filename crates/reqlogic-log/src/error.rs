//! Error types for the transaction log.

use reqlogic_core::ChannelId;
use thiserror::Error;

/// Errors that can occur during log operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogError {
    /// No entries were ever written to this channel.
    #[error("channel not found: {0}")]
    ChannelNotFound(ChannelId),

    /// The log refused or lost a write.
    #[error("persist failed: {0}")]
    Persist(String),

    /// Backend failure (I/O, poisoned state, remote error).
    #[error("log backend error: {0}")]
    Backend(String),
}

/// Result type for log operations.
pub type Result<T> = std::result::Result<T, LogError>;
