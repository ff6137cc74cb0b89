//! ADD_EXTENSIONS_DATA: anyone may attach metadata.

use crate::action::{
    create_action, get_signer_identity_from_action, Action, ActionName, RequestParameters,
    UnsignedActionData,
};
use crate::error::{LogicError, Result};
use crate::identity::Identity;
use crate::request::{Event, Request};
use crate::signature::SignatureProvider;

use super::{require_request_id, require_target};

fn require_extensions_data(params: &RequestParameters) -> Result<&[serde_json::Value]> {
    match params.extensions_data.as_deref() {
        Some(data) if !data.is_empty() => Ok(data),
        _ => Err(LogicError::action("extensionsData must be given")),
    }
}

pub fn format(
    params: RequestParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    version: &str,
) -> Result<Action> {
    require_request_id(params.request_id.as_ref())?;
    require_extensions_data(&params)?;
    let unsigned = UnsignedActionData::new(ActionName::AddExtensionsData, &params, version)?;
    create_action(unsigned, signer, provider)
}

pub fn apply_action_to_request(
    action: &Action,
    request: &Request,
    timestamp: u64,
) -> Result<Request> {
    let params: RequestParameters = action.data.parameters_as()?;
    require_target(params.request_id.as_ref(), request)?;
    let data = require_extensions_data(&params)?;

    let signer = get_signer_identity_from_action(action)?;
    let mut next = request.with_extensions_data(Some(data));
    next.events.push(Event::from_action(action, &signer, timestamp, data.len()));
    Ok(next)
}
