//! Engine configuration.

use reqlogic_core::VersionPolicy;

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Protocol versions accepted while folding.
    pub version_policy: VersionPolicy,
}

impl EngineConfig {
    pub fn with_version_policy(mut self, policy: VersionPolicy) -> Self {
        self.version_policy = policy;
        self
    }
}
