//! INCREASE_EXPECTED_AMOUNT: the payer agrees to pay more.

use crate::action::{
    create_action, get_signer_identity_from_action, Action, ActionName, AmountParameters,
    UnsignedActionData,
};
use crate::amount::{self, Amount};
use crate::error::{LogicError, Result};
use crate::identity::{get_role, Identity, Role};
use crate::request::{Event, Request};
use crate::signature::SignatureProvider;
use crate::types::RequestState;

use super::{require_delta_amount, require_request_id, require_target};

pub fn format(
    params: AmountParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    version: &str,
) -> Result<Action> {
    require_request_id(params.request_id.as_ref())?;
    require_delta_amount(params.delta_amount.as_ref())?;
    let unsigned = UnsignedActionData::new(ActionName::IncreaseExpectedAmount, &params, version)?;
    create_action(unsigned, signer, provider)
}

pub fn apply_action_to_request(
    action: &Action,
    request: &Request,
    timestamp: u64,
) -> Result<Request> {
    let params: AmountParameters = action.data.parameters_as()?;
    require_target(params.request_id.as_ref(), request)?;
    let delta = require_delta_amount(params.delta_amount.as_ref())?;

    if request.payer.is_none() {
        return Err(LogicError::action("the request must have a payer"));
    }
    let signer = get_signer_identity_from_action(action)?;
    if get_role(&signer, request.parties()) != Role::Payer {
        return Err(LogicError::unauthorized("signer must be the payer"));
    }
    if request.state == RequestState::Cancelled {
        return Err(LogicError::transition("the request must not be canceled"));
    }

    let expected = amount::add(&Amount::from(request.expected_amount.as_str()), delta)?;
    let delta_text = delta.to_decimal();

    let mut next = request.with_extensions_data(params.extensions_data.as_deref());
    next.expected_amount = expected;
    let length = params.extensions_data.map_or(0, |d| d.len());
    let mut event = Event::from_action(action, &signer, timestamp, length);
    event.parameters.delta_amount = delta_text;
    next.events.push(event);
    Ok(next)
}
