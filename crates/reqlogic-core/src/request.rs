//! The request aggregate and its events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::action::{Action, ActionName};
use crate::amount::Amount;
use crate::error::{LogicError, Result};
use crate::identity::{Identity, Parties};
use crate::types::{Currency, RequestId, RequestState};

/// State of a request, rebuilt by folding its actions.
///
/// A `Request` is never updated in place: each applied action yields a new
/// value and leaves the previous one untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub version: String,
    pub request_id: RequestId,
    pub creator: Identity,
    pub currency: Currency,
    pub state: RequestState,
    /// Non-negative integer as a decimal string.
    pub expected_amount: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payee: Option<Identity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payer: Option<Identity>,
    /// Side-state maintained by advanced logic, keyed by extension id.
    #[serde(default)]
    pub extensions: BTreeMap<String, serde_json::Value>,
    /// Append-only.
    #[serde(default)]
    pub extensions_data: Vec<serde_json::Value>,
    /// Append-only, one per applied action.
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

impl Request {
    pub fn parties(&self) -> Parties<'_> {
        Parties::new(self.payee.as_ref(), self.payer.as_ref())
    }

    /// Copy of this request with `data` appended to `extensions_data`.
    pub fn with_extensions_data(&self, data: Option<&[serde_json::Value]>) -> Request {
        let mut next = self.clone();
        if let Some(data) = data {
            next.extensions_data.extend_from_slice(data);
        }
        next
    }
}

/// Record of one applied action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: ActionName,
    pub action_signer: Identity,
    pub timestamp: u64,
    pub parameters: EventParameters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions_data_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_signed_request: Option<bool>,
}

impl Event {
    /// Event for `action` with only `extensionsDataLength` set.
    pub fn from_action(
        action: &Action,
        signer: &Identity,
        timestamp: u64,
        extensions_data_length: usize,
    ) -> Self {
        Self {
            name: action.data.name,
            action_signer: signer.clone(),
            timestamp,
            parameters: EventParameters {
                extensions_data_length: Some(extensions_data_length),
                ..Default::default()
            },
        }
    }
}

/// Check the aggregate invariants of a request.
pub fn check_request(request: &Request) -> Result<()> {
    let invalid = |reason: &str| Err(LogicError::InvalidAction(reason.to_string()));

    if request.version.is_empty() {
        return invalid("request.version is missing");
    }
    if request.request_id.is_empty() {
        return invalid("request.requestId is missing");
    }
    if request.currency.value.is_empty() {
        return invalid("request.currency is missing");
    }
    if !request.creator.kind.is_supported() {
        return invalid("request.creator.type not supported");
    }
    if let Some(payee) = &request.payee {
        if !payee.kind.is_supported() {
            return invalid("request.payee.type not supported");
        }
    }
    if let Some(payer) = &request.payer {
        if !payer.kind.is_supported() {
            return invalid("request.payer.type not supported");
        }
    }
    if request.payee.is_none() && request.payer.is_none() {
        return invalid("request.payee and request.payer are missing");
    }
    if !Amount::from(request.expected_amount.as_str()).is_valid() {
        return invalid("expectedAmount must be a positive integer");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::IdentityType;

    fn sample() -> Request {
        Request {
            version: "2.0.3".into(),
            request_id: RequestId::from("01abc"),
            creator: Identity::ethereum("0xAf083f77F1fFd54218d91491AFD06c9296EaC3ce"),
            currency: Currency::eth(),
            state: RequestState::Created,
            expected_amount: "123400000000000000".into(),
            payee: Some(Identity::ethereum("0xAf083f77F1fFd54218d91491AFD06c9296EaC3ce")),
            payer: Some(Identity::ethereum("0x740fc87Bd3f41d07d23A01DEc90623eBC5fed9D6")),
            extensions: BTreeMap::new(),
            extensions_data: Vec::new(),
            events: Vec::new(),
            timestamp: None,
            nonce: None,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(check_request(&sample()).is_ok());
    }

    #[test]
    fn test_missing_fields() {
        let mut r = sample();
        r.version.clear();
        assert_eq!(check_request(&r).unwrap_err().reason(), "request.version is missing");

        let mut r = sample();
        r.request_id = RequestId::from("");
        assert_eq!(check_request(&r).unwrap_err().reason(), "request.requestId is missing");

        let mut r = sample();
        r.payee = None;
        r.payer = None;
        assert_eq!(
            check_request(&r).unwrap_err().reason(),
            "request.payee and request.payer are missing"
        );
    }

    #[test]
    fn test_unsupported_identity_types() {
        let mut r = sample();
        r.creator.kind = IdentityType::Other("x".into());
        assert_eq!(check_request(&r).unwrap_err().reason(), "request.creator.type not supported");

        let mut r = sample();
        r.payer = Some(Identity::new(IdentityType::Other("x".into()), "y"));
        assert_eq!(check_request(&r).unwrap_err().reason(), "request.payer.type not supported");
    }

    #[test]
    fn test_invalid_amount() {
        let mut r = sample();
        r.expected_amount = "-5".into();
        assert!(check_request(&r).is_err());
    }

    #[test]
    fn test_with_extensions_data_copies() {
        let r = sample();
        let data = vec![serde_json::json!({"id": "extension1", "value": "whatever1"})];
        let next = r.with_extensions_data(Some(&data));
        assert_eq!(next.extensions_data.len(), 1);
        assert!(r.extensions_data.is_empty());
    }

    #[test]
    fn test_serde_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("requestId").is_some());
        assert!(json.get("expectedAmount").is_some());
        assert!(json.get("extensionsData").is_some());
        assert!(json.get("nonce").is_none());
        let back: Request = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample());
    }
}
