//! Arbitrary-precision, non-negative amounts.
//!
//! An amount arrives in one of three shapes: a decimal string, a JSON number,
//! or an in-memory big integer. Arithmetic always produces a decimal string.

use num_bigint::BigUint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{LogicError, Result};

/// Largest integer a JSON number can carry without precision loss.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// An amount in any of its accepted representations.
#[derive(Clone, PartialEq, Eq)]
pub enum Amount {
    Text(String),
    Number(serde_json::Number),
    Big(BigUint),
}

impl Amount {
    /// True iff the amount is a non-negative integer.
    ///
    /// Strings must match `^[0-9]+$`; numbers must be safe integers.
    pub fn is_valid(&self) -> bool {
        match self {
            Amount::Big(_) => true,
            Amount::Text(s) => !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()),
            Amount::Number(n) => n.as_u64().map_or(false, |v| v <= MAX_SAFE_INTEGER),
        }
    }

    /// The amount as a big integer, if valid.
    pub fn to_biguint(&self) -> Option<BigUint> {
        if !self.is_valid() {
            return None;
        }
        match self {
            Amount::Big(b) => Some(b.clone()),
            Amount::Text(s) => BigUint::parse_bytes(s.as_bytes(), 10),
            Amount::Number(n) => n.as_u64().map(BigUint::from),
        }
    }

    /// Normalized decimal rendering, if valid.
    pub fn to_decimal(&self) -> Option<String> {
        self.to_biguint().map(|b| b.to_str_radix(10))
    }
}

/// Returns `a + b` as a decimal string.
pub fn add(a: &Amount, b: &Amount) -> Result<String> {
    let (a, b) = operands(a, b)?;
    Ok((a + b).to_str_radix(10))
}

/// Returns `a - b` as a decimal string. Fails when the result would be negative.
pub fn reduce(a: &Amount, b: &Amount) -> Result<String> {
    let (a, b) = operands(a, b)?;
    if b > a {
        return Err(LogicError::InvalidAmount(
            "result of reduce is not valid".into(),
        ));
    }
    Ok((a - b).to_str_radix(10))
}

fn operands(a: &Amount, b: &Amount) -> Result<(BigUint, BigUint)> {
    match (a.to_biguint(), b.to_biguint()) {
        (Some(a), Some(b)) => Ok((a, b)),
        _ => Err(LogicError::InvalidAmount(
            "amount must be a non-negative integer".into(),
        )),
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Text(s) => write!(f, "Amount({:?})", s),
            Amount::Number(n) => write!(f, "Amount({})", n),
            Amount::Big(b) => write!(f, "Amount({}n)", b),
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Amount::Text(s) => f.write_str(s),
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Big(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for Amount {
    fn from(s: &str) -> Self {
        Amount::Text(s.to_string())
    }
}

impl From<String> for Amount {
    fn from(s: String) -> Self {
        Amount::Text(s)
    }
}

impl From<u64> for Amount {
    fn from(n: u64) -> Self {
        Amount::Number(n.into())
    }
}

impl From<BigUint> for Amount {
    fn from(b: BigUint) -> Self {
        Amount::Big(b)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Amount::Text(s) => serializer.serialize_str(s),
            Amount::Number(n) => n.serialize(serializer),
            Amount::Big(b) => serializer.serialize_str(&b.to_str_radix(10)),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => Ok(Amount::Text(s)),
            serde_json::Value::Number(n) => Ok(Amount::Number(n)),
            other => Err(serde::de::Error::custom(format!(
                "amount must be a string or a number, got {}",
                other
            ))),
        }
    }
}
