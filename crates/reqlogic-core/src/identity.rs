//! Identities and role resolution.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Kind of identity. Only Ethereum addresses are supported; anything else is
/// kept so that handlers can reject it with a precise reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IdentityType {
    EthereumAddress,
    Other(String),
}

impl IdentityType {
    pub fn as_str(&self) -> &str {
        match self {
            IdentityType::EthereumAddress => "ethereumAddress",
            IdentityType::Other(s) => s,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, IdentityType::EthereumAddress)
    }
}

impl Serialize for IdentityType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for IdentityType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "ethereumAddress" => IdentityType::EthereumAddress,
            _ => IdentityType::Other(s),
        })
    }
}

/// A party identity: `{ type, value }`.
///
/// Equality ignores the case of `value`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Identity {
    #[serde(rename = "type")]
    pub kind: IdentityType,
    pub value: String,
}

impl Identity {
    pub fn new(kind: IdentityType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn ethereum(address: impl Into<String>) -> Self {
        Self::new(IdentityType::EthereumAddress, address)
    }

    /// Same identity with its value lowercased.
    pub fn normalized(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            value: self.value.to_lowercase(),
        }
    }

    /// True when the value is well-formed for the identity type.
    pub fn has_valid_value(&self) -> bool {
        match self.kind {
            IdentityType::EthereumAddress => is_ethereum_address(&self.value),
            IdentityType::Other(_) => false,
        }
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        are_equal(self, other)
    }
}

impl Eq for Identity {}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({}:{})", self.kind.as_str(), self.value)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// True iff both identities have the same type and case-insensitively equal values.
pub fn are_equal(a: &Identity, b: &Identity) -> bool {
    a.kind == b.kind && a.value.to_lowercase() == b.value.to_lowercase()
}

/// `0x` followed by exactly 40 hex digits.
pub fn is_ethereum_address(value: &str) -> bool {
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Role of an identity relative to a request or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Payee,
    Payer,
    ThirdParty,
}

/// The payee and payer of a request or a creation action.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parties<'a> {
    pub payee: Option<&'a Identity>,
    pub payer: Option<&'a Identity>,
}

impl<'a> Parties<'a> {
    pub fn new(payee: Option<&'a Identity>, payer: Option<&'a Identity>) -> Self {
        Self { payee, payer }
    }
}

/// Resolve the role of `identity`. The payee is checked first, so an identity
/// that is both payee and payer resolves to [`Role::Payee`].
pub fn get_role(identity: &Identity, parties: Parties<'_>) -> Role {
    if parties.payee.map_or(false, |p| are_equal(p, identity)) {
        Role::Payee
    } else if parties.payer.map_or(false, |p| are_equal(p, identity)) {
        Role::Payer
    } else {
        Role::ThirdParty
    }
}
