//! ACCEPT: the payer agrees to a created request.

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
    let unsigned = UnsignedActionData::new(ActionName::Accept, &params, version)?;
    create_action(unsigned, signer, provider)
}

pub fn apply_action_to_request(
    action: &Action,
    request: &Request,
    timestamp: u64,
) -> Result<Request> {
    let params: RequestParameters = action.data.parameters_as()?;
    require_target(params.request_id.as_ref(), request)?;

    if request.payer.is_none() {
        return Err(LogicError::action("the request must have a payer"));
    }
    let signer = get_signer_identity_from_action(action)?;
    if get_role(&signer, request.parties()) != Role::Payer {
        return Err(LogicError::unauthorized("Signer must be the payer"));
    }
    if request.state != RequestState::Created {
        return Err(LogicError::transition("the request state must be created"));
    }

    let mut next = request.with_extensions_data(params.extensions_data.as_deref());
    next.state = RequestState::Accepted;
    let length = params.extensions_data.map_or(0, |d| d.len());
    next.events.push(Event::from_action(action, &signer, timestamp, length));
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::test_support::*;
    use serde_json::json;

    fn accept(key: &str, request: &Request) -> Result<Request> {
        let action = action(
            ActionName::Accept,
            json!({"requestId": request.request_id}),
            key,
        );
        apply_action_to_request(&action, request, TIMESTAMP + 1)
    }

    #[test]
    fn test_payer_accepts() {
        let request = created_request();
        let accepted = accept(PAYER_KEY, &request).unwrap();

        assert_eq!(accepted.state, RequestState::Accepted);
        assert_eq!(accepted.events.len(), 2);
        let event = &accepted.events[1];
        assert_eq!(event.name, ActionName::Accept);
        assert_eq!(event.action_signer, payer());
        assert_eq!(event.timestamp, TIMESTAMP + 1);
        assert_eq!(event.parameters.extensions_data_length, Some(0));

        // The prior snapshot is untouched.
        assert_eq!(request.state, RequestState::Created);
        assert_eq!(request.events.len(), 1);
    }

    #[test]
    fn test_payee_cannot_accept() {
        let err = accept(PAYEE_KEY, &created_request()).unwrap_err();
        assert_eq!(err, LogicError::NotAuthorized("Signer must be the payer".into()));
    }

    #[test]
    fn test_third_party_cannot_accept() {
        let err = accept(OTHER_KEY, &created_request()).unwrap_err();
        assert!(matches!(err, LogicError::NotAuthorized(_)));
    }

    #[test]
    fn test_accept_twice() {
        let accepted = accept(PAYER_KEY, &created_request()).unwrap();
        let err = accept(PAYER_KEY, &accepted).unwrap_err();
        assert_eq!(
            err,
            LogicError::InvalidTransition("the request state must be created".into())
        );
    }

    #[test]
    fn test_request_without_payer() {
        let mut request = created_request();
        request.payer = None;
        let err = accept(PAYER_KEY, &request).unwrap_err();
        assert_eq!(err.reason(), "the request must have a payer");
    }

    #[test]
    fn test_missing_request_id() {
        let action = action(ActionName::Accept, json!({}), PAYER_KEY);
        let err = apply_action_to_request(&action, &created_request(), TIMESTAMP).unwrap_err();
        assert_eq!(err, LogicError::InvalidAction("requestId must be given".into()));
    }

    #[test]
    fn test_action_for_other_request() {
        let action = action(ActionName::Accept, json!({"requestId": "01other"}), PAYER_KEY);
        let err = apply_action_to_request(&action, &created_request(), TIMESTAMP).unwrap_err();
        assert_eq!(
            err,
            LogicError::InvalidAction("requestId does not match the request".into())
        );
    }

    #[test]
    fn test_extensions_data_appended() {
        let request = created_request();
        let action = action(
            ActionName::Accept,
            json!({"requestId": request.request_id, "extensionsData": one_extension()}),
            PAYER_KEY,
        );
        let accepted = apply_action_to_request(&action, &request, TIMESTAMP).unwrap();
        assert_eq!(accepted.extensions_data, one_extension());
        assert_eq!(accepted.events[1].parameters.extensions_data_length, Some(1));
    }
}
