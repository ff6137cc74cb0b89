//! CANCEL: the payer withdraws before accepting, or the payee withdraws at any time.

use crate::action::{
    create_action, get_signer_identity_from_action, Action, ActionName, RequestParameters,
    UnsignedActionData,
};
use crate::error::{LogicError, Result};
use crate::identity::{get_role, Identity, Role};
use crate::request::{Event, Request};
use crate::signature::SignatureProvider;
use crate::types::RequestState;

use super::{require_request_id, require_target};

pub fn format(
    params: RequestParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    version: &str,
) -> Result<Action> {
    require_request_id(params.request_id.as_ref())?;
    let unsigned = UnsignedActionData::new(ActionName::Cancel, &params, version)?;
    create_action(unsigned, signer, provider)
}

pub fn apply_action_to_request(
    action: &Action,
    request: &Request,
    timestamp: u64,
) -> Result<Request> {
    let params: RequestParameters = action.data.parameters_as()?;
    require_target(params.request_id.as_ref(), request)?;

    let signer = get_signer_identity_from_action(action)?;
    match get_role(&signer, request.parties()) {
        Role::Payer => {
            if request.state != RequestState::Created {
                return Err(LogicError::transition(
                    "A payer cancel need to be done on a request with the state created",
                ));
            }
        }
        Role::Payee => {
            if request.state == RequestState::Cancelled {
                return Err(LogicError::transition("Cannot cancel an already canceled request"));
            }
        }
        Role::ThirdParty => {
            return Err(LogicError::unauthorized("Signer must be the payer or the payee"))
        }
    }

    let mut next = request.with_extensions_data(params.extensions_data.as_deref());
    next.state = RequestState::Cancelled;
    let length = params.extensions_data.map_or(0, |d| d.len());
    next.events.push(Event::from_action(action, &signer, timestamp, length));
    Ok(next)
}
