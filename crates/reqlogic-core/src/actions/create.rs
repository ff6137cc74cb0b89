//! CREATE: birth of a request.

use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::action::{
    create_action, get_request_id, get_signer_identity_from_action, Action, ActionName,
    CreateParameters, UnsignedActionData,
};
use crate::error::{LogicError, Result};
use crate::identity::{get_role, Identity, Parties, Role};
use crate::request::{Event, EventParameters, Request};
use crate::signature::SignatureProvider;
use crate::types::RequestState;

/// Check and sign a CREATE action.
///
/// `timestamp` defaults to the current time in seconds.
pub fn format(
    mut params: CreateParameters,
    signer: &Identity,
    provider: &dyn SignatureProvider,
    version: &str,
) -> Result<Action> {
    check_parameters(&params)?;
    if params.timestamp.is_none() {
        params.timestamp = Some(now_seconds());
    }
    let unsigned = UnsignedActionData::new(ActionName::Create, &params, version)?;
    create_action(unsigned, signer, provider)
}

/// Build the initial request from a CREATE action.
pub fn create_request(action: &Action, timestamp: u64) -> Result<Request> {
    let params: CreateParameters = action.data.parameters_as()?;
    check_parameters(&params)?;

    let currency = params
        .currency
        .clone()
        .ok_or_else(|| LogicError::action("action.parameters.currency must be given"))?;
    let expected_amount = params
        .expected_amount
        .as_ref()
        .and_then(|a| a.to_decimal())
        .ok_or_else(|| {
            LogicError::InvalidAmount("expectedAmount must be a positive integer".into())
        })?;

    let signer = get_signer_identity_from_action(action)?;
    let parties = Parties::new(params.payee.as_ref(), params.payer.as_ref());
    let (state, creator) = match get_role(&signer, parties) {
        Role::Payee => (RequestState::Created, params.payee.clone()),
        Role::Payer => (RequestState::Accepted, params.payer.clone()),
        Role::ThirdParty => {
            return Err(LogicError::unauthorized("Signer must be the payee or the payer"))
        }
    };
    let creator = creator.unwrap_or_else(|| signer.clone());

    let extensions_data = params.extensions_data.clone().unwrap_or_default();
    let event = Event {
        name: ActionName::Create,
        action_signer: signer,
        timestamp,
        parameters: EventParameters {
            expected_amount: Some(expected_amount.clone()),
            extensions_data_length: Some(extensions_data.len()),
            is_signed_request: Some(false),
            ..Default::default()
        },
    };

    Ok(Request {
        version: action.data.version.clone(),
        request_id: get_request_id(action)?,
        creator,
        currency,
        state,
        expected_amount,
        payee: params.payee,
        payer: params.payer,
        extensions: BTreeMap::new(),
        extensions_data,
        events: vec![event],
        timestamp: params.timestamp,
        nonce: params.nonce,
    })
}

fn check_parameters(params: &CreateParameters) -> Result<()> {
    if params.payee.is_none() && params.payer.is_none() {
        return Err(LogicError::action(
            "action.parameters.payee or action.parameters.payer must be given",
        ));
    }
    match &params.expected_amount {
        Some(amount) if amount.is_valid() => {}
        _ => {
            return Err(LogicError::InvalidAmount(
                "expectedAmount must be a positive integer".into(),
            ))
        }
    }
    check_identity("payee", params.payee.as_ref())?;
    check_identity("payer", params.payer.as_ref())
}

fn check_identity(field: &str, identity: Option<&Identity>) -> Result<()> {
    let Some(identity) = identity else {
        return Ok(());
    };
    if !identity.kind.is_supported() {
        return Err(LogicError::action(format!("{}: identity type not supported", field)));
    }
    if !identity.has_valid_value() {
        return Err(LogicError::action(format!(
            "{}: identity value must be an ethereum address",
            field
        )));
    }
    Ok(())
}

fn now_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
