//! Strong type definitions for request logic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a request, `"01"` followed by a hex Keccak-256.
///
/// It is also the channel id under which the request's actions are logged.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.0.get(..18).unwrap_or(&self.0);
        write!(f, "RequestId({})", short)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Channel ids in the transaction log are request ids.
pub type ChannelId = RequestId;

/// Currency family of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurrencyType {
    #[serde(rename = "ETH")]
    Eth,
    #[serde(rename = "BTC")]
    Btc,
    #[serde(rename = "ERC20")]
    Erc20,
    #[serde(rename = "ISO4217")]
    Iso4217,
}

/// `{ type, value }`, e.g. `{ "type": "ISO4217", "value": "EUR" }`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    #[serde(rename = "type")]
    pub kind: CurrencyType,
    pub value: String,
}

impl Currency {
    pub fn new(kind: CurrencyType, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    pub fn eth() -> Self {
        Self::new(CurrencyType::Eth, "ETH")
    }

    pub fn btc() -> Self {
        Self::new(CurrencyType::Btc, "BTC")
    }

    pub fn iso4217(code: impl Into<String>) -> Self {
        Self::new(CurrencyType::Iso4217, code)
    }
}

/// Lifecycle state of a request.
///
/// Only `Created -> Accepted` is ever left other than towards `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Created,
    Accepted,
    Cancelled,
}
