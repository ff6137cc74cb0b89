//! Pre-submission validation of a new action.

use reqlogic_core::{apply_action_to_request, Action, LogicError, Request};

use crate::engine::{FoldOutcome, Reconciler};

impl Reconciler {
    /// Check that `action` would apply on top of the current state.
    ///
    /// Tries the confirmed state first, then the pending state. Returns the
    /// resulting request, or the error of the last attempt when both fail.
    /// Advisory only: nothing is persisted or rejected here.
    pub fn validate_against(
        &self,
        action: &Action,
        timestamp: u64,
        outcome: &FoldOutcome,
    ) -> Result<Request, LogicError> {
        let apply = |state: Option<&Request>| {
            apply_action_to_request(
                state,
                action,
                timestamp,
                &self.config().version_policy,
                self.advanced_logic(),
            )
        };

        match apply(outcome.confirmed.as_ref()) {
            Ok(request) => Ok(request),
            Err(err) if outcome.pending == outcome.confirmed => Err(err),
            Err(_) => apply(outcome.pending.as_ref()),
        }
    }
}
