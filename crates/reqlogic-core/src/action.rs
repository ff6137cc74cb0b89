//! Signed actions: the unit written to the transaction log.
//!
//! An [`Action`] is `{ data, signature }` where `data` is the unsigned,
//! versioned instruction. `parameters` is kept as raw JSON so that a missing
//! or malformed parameter is reported by the handler that needs it rather
//! than failing the whole parse.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::amount::Amount;
use crate::canonical::{content_hash, normalized_hash};
use crate::crypto::ContentHash;
use crate::error::{LogicError, Result};
use crate::identity::{get_role, Identity, Parties, Role};
use crate::signature::{recover, Signature, SignatureProvider};
use crate::types::{Currency, RequestId};
use crate::version::{is_supported, VersionPolicy};

/// Kind of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionName {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "accept")]
    Accept,
    #[serde(rename = "cancel")]
    Cancel,
    #[serde(rename = "increaseExpectedAmount")]
    IncreaseExpectedAmount,
    #[serde(rename = "reduceExpectedAmount")]
    ReduceExpectedAmount,
    #[serde(rename = "addExtensionsData")]
    AddExtensionsData,
}

/// `{ name, parameters, version }`, the signed part of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsignedActionData {
    pub name: ActionName,
    pub parameters: serde_json::Value,
    pub version: String,
}

impl UnsignedActionData {
    pub fn new<P: Serialize>(
        name: ActionName,
        parameters: &P,
        version: impl Into<String>,
    ) -> Result<Self> {
        let parameters = serde_json::to_value(parameters)
            .map_err(|e| LogicError::action(format!("parameters cannot be serialized: {}", e)))?;
        Ok(Self {
            name,
            parameters,
            version: version.into(),
        })
    }

    /// Interpret `parameters` as the typed parameters of a handler.
    pub fn parameters_as<P: DeserializeOwned>(&self) -> Result<P> {
        serde_json::from_value(self.parameters.clone())
            .map_err(|e| LogicError::action(format!("action.parameters are malformed: {}", e)))
    }
}

/// A signed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub data: UnsignedActionData,
    pub signature: Signature,
}

impl Action {
    /// Parse an action from its wire bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|e| LogicError::ParseError(e.to_string()))
    }

    /// Wire bytes of this action.
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| LogicError::ParseError(e.to_string()))
    }

    /// Content address of the whole signed action.
    pub fn content_hash(&self) -> Result<ContentHash> {
        content_hash(self)
    }
}

/// Parameters of CREATE.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<Identity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_data: Option<Vec<serde_json::Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<u64>,
}

/// Parameters of ACCEPT, CANCEL and ADD_EXTENSIONS_DATA.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_data: Option<Vec<serde_json::Value>>,
}

impl RequestParameters {
    pub fn new(request_id: impl Into<RequestId>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            extensions_data: None,
        }
    }

    pub fn with_extensions_data(mut self, data: Vec<serde_json::Value>) -> Self {
        self.extensions_data = Some(data);
        self
    }
}

/// Parameters of INCREASE_EXPECTED_AMOUNT and REDUCE_EXPECTED_AMOUNT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_amount: Option<Amount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions_data: Option<Vec<serde_json::Value>>,
}

impl AmountParameters {
    pub fn new(request_id: impl Into<RequestId>, delta_amount: impl Into<Amount>) -> Self {
        Self {
            request_id: Some(request_id.into()),
            delta_amount: Some(delta_amount.into()),
            extensions_data: None,
        }
    }

    pub fn with_extensions_data(mut self, data: Vec<serde_json::Value>) -> Self {
        self.extensions_data = Some(data);
        self
    }
}

/// Sign `unsigned` as `signer` through `provider`.
///
/// Authorization is not checked here; handlers decide who may do what.
pub fn create_action(
    unsigned: UnsignedActionData,
    signer: &Identity,
    provider: &dyn SignatureProvider,
) -> Result<Action> {
    let data = serde_json::to_value(&unsigned)?;
    let signature = provider.sign(&data, signer)?;
    Ok(Action {
        data: unsigned,
        signature,
    })
}

/// The request id an action belongs to.
///
/// CREATE derives it from the hash of its data; every other action names it
/// in `parameters.requestId`.
pub fn get_request_id(action: &Action) -> Result<RequestId> {
    if action.data.name == ActionName::Create {
        return Ok(RequestId(normalized_hash(&action.data)?));
    }
    match action.data.parameters.get("requestId") {
        Some(serde_json::Value::String(id)) if !id.is_empty() => Ok(RequestId(id.clone())),
        _ => Err(LogicError::action("requestId must be given")),
    }
}

/// Identity that signed the action.
pub fn get_signer_identity_from_action(action: &Action) -> Result<Identity> {
    recover(&action.data, &action.signature)
}

/// Role of `identity` relative to the payee and payer named in the action.
pub fn get_role_in_action(identity: &Identity, action: &Action) -> Role {
    let party = |key: &str| -> Option<Identity> {
        action
            .data
            .parameters
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    };
    let payee = party("payee");
    let payer = party("payer");
    get_role(identity, Parties::new(payee.as_ref(), payer.as_ref()))
}

pub fn get_version_from_action(action: &Action) -> &str {
    &action.data.version
}

pub fn is_action_version_supported(action: &Action, policy: &VersionPolicy) -> bool {
    is_supported(&action.data.version, policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::{sign, SignatureMethod, SignatureParameters};
    use serde_json::json;

    const PAYEE_KEY: &str = "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d";
    const PAYEE: &str = "0x90F8bf6A479f320ead074411a4B0e7944Ea8c9C1";

    fn signed(data: UnsignedActionData) -> Action {
        let signature = sign(&data, &SignatureParameters::ecdsa(PAYEE_KEY)).unwrap();
        Action { data, signature }
    }

    #[test]
    fn test_name_serde() {
        assert_eq!(
            serde_json::to_value(ActionName::IncreaseExpectedAmount).unwrap(),
            json!("increaseExpectedAmount")
        );
        assert_eq!(
            serde_json::from_value::<ActionName>(json!("addExtensionsData")).unwrap(),
            ActionName::AddExtensionsData
        );
    }

    #[test]
    fn test_request_id_of_create_is_data_hash() {
        let data = UnsignedActionData {
            name: ActionName::Create,
            parameters: json!({
                "expectedAmount": "1",
                "payee": {"type": "ethereumAddress", "value": PAYEE},
            }),
            version: "2.0.3".into(),
        };
        let action = signed(data.clone());
        let id = get_request_id(&action).unwrap();
        assert_eq!(id.as_str(), normalized_hash(&data).unwrap());
        assert!(id.as_str().starts_with("01"));
    }

    #[test]
    fn test_request_id_from_parameters() {
        let action = signed(UnsignedActionData {
            name: ActionName::Accept,
            parameters: json!({"requestId": "01abc"}),
            version: "2.0.3".into(),
        });
        assert_eq!(get_request_id(&action).unwrap(), RequestId::from("01abc"));
    }

    #[test]
    fn test_request_id_missing() {
        let action = signed(UnsignedActionData {
            name: ActionName::Cancel,
            parameters: json!({}),
            version: "2.0.3".into(),
        });
        let err = get_request_id(&action).unwrap_err();
        assert_eq!(err, LogicError::InvalidAction("requestId must be given".into()));
    }

    #[test]
    fn test_signer_and_role() {
        let action = signed(UnsignedActionData {
            name: ActionName::Create,
            parameters: json!({"payee": {"type": "ethereumAddress", "value": PAYEE}}),
            version: "2.0.3".into(),
        });
        let signer = get_signer_identity_from_action(&action).unwrap();
        assert_eq!(signer, Identity::ethereum(PAYEE));
        assert_eq!(get_role_in_action(&signer, &action), Role::Payee);
        assert_eq!(
            get_role_in_action(
                &Identity::ethereum("0x0000000000000000000000000000000000000001"),
                &action
            ),
            Role::ThirdParty
        );
    }

    #[test]
    fn test_version_accessors() {
        let action = signed(UnsignedActionData {
            name: ActionName::Accept,
            parameters: json!({"requestId": "01abc"}),
            version: "3.0.0".into(),
        });
        assert_eq!(get_version_from_action(&action), "3.0.0");
        assert!(!is_action_version_supported(&action, &VersionPolicy::default()));
    }

    #[test]
    fn test_wire_roundtrip_preserves_signature() {
        let action = signed(UnsignedActionData {
            name: ActionName::Accept,
            parameters: json!({"requestId": "01abc"}),
            version: "2.0.3".into(),
        });
        let bytes = action.to_vec().unwrap();
        let parsed = Action::from_slice(&bytes).unwrap();
        assert_eq!(parsed, action);
        assert_eq!(parsed.signature.method, SignatureMethod::Ecdsa);
        assert_eq!(
            get_signer_identity_from_action(&parsed).unwrap(),
            Identity::ethereum(PAYEE)
        );
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            Action::from_slice(b"not json"),
            Err(LogicError::ParseError(_))
        ));
    }
}
