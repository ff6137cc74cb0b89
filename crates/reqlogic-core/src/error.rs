//! Error types for request logic.

use thiserror::Error;

/// Errors raised while formatting, signing, or applying actions.
///
/// The `Display` of every variant is exactly its reason, so reconciliation
/// can copy it verbatim into a quarantine record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogicError {
    /// Malformed amount, or an amount operation that would go negative.
    #[error("{0}")]
    InvalidAmount(String),

    /// Missing or malformed action parameter.
    #[error("{0}")]
    InvalidAction(String),

    /// The signer's role does not permit the action.
    #[error("{0}")]
    NotAuthorized(String),

    /// The action is not permitted from the request's current state.
    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0}")]
    UnsupportedVersion(String),

    #[error("{0}")]
    UnsupportedMethod(String),

    /// A payload did not deserialize into an action.
    #[error("{0}")]
    ParseError(String),

    /// Malformed key or signature material.
    #[error("{0}")]
    Crypto(String),
}

impl LogicError {
    pub(crate) fn action(reason: impl Into<String>) -> Self {
        Self::InvalidAction(reason.into())
    }

    pub(crate) fn unauthorized(reason: impl Into<String>) -> Self {
        Self::NotAuthorized(reason.into())
    }

    pub(crate) fn transition(reason: impl Into<String>) -> Self {
        Self::InvalidTransition(reason.into())
    }

    /// The reason carried by this error.
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidAmount(r)
            | Self::InvalidAction(r)
            | Self::NotAuthorized(r)
            | Self::InvalidTransition(r)
            | Self::UnsupportedVersion(r)
            | Self::UnsupportedMethod(r)
            | Self::ParseError(r)
            | Self::Crypto(r) => r,
        }
    }
}

impl From<serde_json::Error> for LogicError {
    fn from(e: serde_json::Error) -> Self {
        LogicError::ParseError(e.to_string())
    }
}

/// Result alias for request logic operations.
pub type Result<T> = std::result::Result<T, LogicError>;
