//! Request state machine: dispatch of a signed action onto a request.

use crate::action::{
    get_request_id, is_action_version_supported, Action, ActionName, AmountParameters,
    CreateParameters, RequestParameters,
};
use crate::actions::{
    accept, add_extensions_data, cancel, create, increase_expected_amount, reduce_expected_amount,
};
use crate::advanced::AdvancedLogic;
use crate::error::{LogicError, Result};
use crate::identity::Identity;
use crate::request::{check_request, Request};
use crate::signature::SignatureProvider;
use crate::types::RequestId;
use crate::version::VersionPolicy;

/// Apply `action` to `request`, returning the next request.
///
/// `request` must be `None` exactly when the action is a CREATE. The prior
/// request is only borrowed; on error the caller's value is unchanged.
pub fn apply_action_to_request(
    request: Option<&Request>,
    action: &Action,
    timestamp: u64,
    policy: &VersionPolicy,
    advanced_logic: Option<&dyn AdvancedLogic>,
) -> Result<Request> {
    if !is_action_version_supported(action, policy) {
        return Err(LogicError::UnsupportedVersion(
            "action version not supported".into(),
        ));
    }

    let next = match (request, action.data.name) {
        (None, ActionName::Create) => create::create_request(action, timestamp)?,
        (None, _) => return Err(LogicError::action("request is expected")),
        (Some(request), name) => {
            check_request(request)?;
            match name {
                ActionName::Create => {
                    return Err(LogicError::action("no request is expected at the creation"))
                }
                ActionName::Accept => accept::apply_action_to_request(action, request, timestamp)?,
                ActionName::Cancel => cancel::apply_action_to_request(action, request, timestamp)?,
                ActionName::IncreaseExpectedAmount => {
                    increase_expected_amount::apply_action_to_request(action, request, timestamp)?
                }
                ActionName::ReduceExpectedAmount => {
                    reduce_expected_amount::apply_action_to_request(action, request, timestamp)?
                }
                ActionName::AddExtensionsData => {
                    add_extensions_data::apply_action_to_request(action, request, timestamp)?
                }
            }
        }
    };

    match advanced_logic {
        Some(logic) => logic.apply_action_to_request(next, action, timestamp),
        None => Ok(next),
    }
}

/// Fold `actions` in order from an empty state, stopping at the first error.
pub fn apply_actions(
    actions: &[(Action, u64)],
    policy: &VersionPolicy,
    advanced_logic: Option<&dyn AdvancedLogic>,
) -> Result<Option<Request>> {
    let mut state: Option<Request> = None;
    for (action, timestamp) in actions {
        state = Some(apply_action_to_request(
            state.as_ref(),
            action,
            *timestamp,
            policy,
            advanced_logic,
        )?);
    }
    Ok(state)
}

/// Request id that a CREATE with these parameters would produce.
pub fn compute_request_id(
    params: CreateParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    policy: &VersionPolicy,
) -> Result<RequestId> {
    let action = format_create(params, signer, provider, policy)?;
    get_request_id(&action)
}

pub fn format_create(
    params: CreateParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    policy: &VersionPolicy,
) -> Result<Action> {
    create::format(params, signer, provider, &policy.current)
}

pub fn format_accept(
    params: RequestParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    policy: &VersionPolicy,
) -> Result<Action> {
    accept::format(params, signer, provider, &policy.current)
}

pub fn format_cancel(
    params: RequestParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    policy: &VersionPolicy,
) -> Result<Action> {
    cancel::format(params, signer, provider, &policy.current)
}

pub fn format_increase_expected_amount(
    params: AmountParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    policy: &VersionPolicy,
) -> Result<Action> {
    increase_expected_amount::format(params, signer, provider, &policy.current)
}

pub fn format_reduce_expected_amount(
    params: AmountParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    policy: &VersionPolicy,
) -> Result<Action> {
    reduce_expected_amount::format(params, signer, provider, &policy.current)
}

pub fn format_add_extensions_data(
    params: RequestParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    policy: &VersionPolicy,
) -> Result<Action> {
    add_extensions_data::format(params, signer, provider, &policy.current)
}
