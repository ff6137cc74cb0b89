//! Protocol version gate.

use semver::Version;
use serde::{Deserialize, Serialize};

/// Version stamped on newly formatted actions.
pub const CURRENT_VERSION: &str = "2.0.3";

/// Which protocol versions are accepted.
///
/// Passed explicitly to every operation that reads or writes actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPolicy {
    pub current: String,
    /// Versions that are otherwise compatible but explicitly refused.
    pub exceptions: Vec<String>,
}

impl Default for VersionPolicy {
    fn default() -> Self {
        Self {
            current: CURRENT_VERSION.to_string(),
            exceptions: Vec::new(),
        }
    }
}

impl VersionPolicy {
    pub fn new(current: impl Into<String>) -> Self {
        Self {
            current: current.into(),
            exceptions: Vec::new(),
        }
    }

    pub fn with_exception(mut self, version: impl Into<String>) -> Self {
        self.exceptions.push(version.into());
        self
    }

    /// See [`is_supported`].
    pub fn supports(&self, version: &str) -> bool {
        is_supported(version, self)
    }
}

/// True iff `version` is valid semver, shares the major of `policy.current`,
/// is not newer than it, and is not listed as an exception.
pub fn is_supported(version: &str, policy: &VersionPolicy) -> bool {
    let (Ok(candidate), Ok(current)) = (Version::parse(version), Version::parse(&policy.current))
    else {
        return false;
    };

    candidate.major == current.major
        && candidate <= current
        && !policy.exceptions.iter().any(|e| e == version)
}
