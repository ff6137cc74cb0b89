//! Canonical CBOR encoding of JSON values.
//!
//! Action data is JSON on the wire, but hashes and signatures are computed
//! over a deterministic binary form (RFC 8949 Core Deterministic Encoding):
//! - Map keys sorted by encoded byte comparison
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - Non-integer numbers as 64-bit floats
//!
//! Two JSON documents that differ only in key order or whitespace therefore
//! produce identical bytes, identical hashes, and identical request ids.

use ciborium::value::Value;
use serde::Serialize;

use crate::crypto::{keccak256, ContentHash};
use crate::error::{LogicError, Result};

/// Prefix tagging the hash algorithm of a normalized hash (Keccak-256).
pub const HASH_ALGORITHM_TAG: &str = "01";

/// Encode any serializable value to canonical bytes, via its JSON form.
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let json = serde_json::to_value(value)
        .map_err(|e| LogicError::ParseError(format!("cannot serialize: {}", e)))?;
    Ok(canonical_json_bytes(&json))
}

/// Encode a JSON value to canonical bytes.
pub fn canonical_json_bytes(json: &serde_json::Value) -> Vec<u8> {
    let value = json_to_cbor_value(json);
    let mut buf = Vec::new();
    encode_value_to(&mut buf, &value);
    buf
}

/// `"01"` followed by the hex Keccak-256 of the canonical bytes.
pub fn normalized_hash<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = canonical_bytes(value)?;
    Ok(format!("{}{}", HASH_ALGORITHM_TAG, hex::encode(keccak256(&bytes))))
}

/// Raw Keccak-256 of the canonical bytes, the digest fed to sign and recover.
pub fn normalized_digest<T: Serialize + ?Sized>(value: &T) -> Result<[u8; 32]> {
    Ok(keccak256(&canonical_bytes(value)?))
}

/// BLAKE3 content address of the canonical bytes.
pub fn content_hash<T: Serialize + ?Sized>(value: &T) -> Result<ContentHash> {
    Ok(ContentHash::hash(&canonical_bytes(value)?))
}

fn json_to_cbor_value(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Value::Integer(u.into())
            } else if let Some(i) = n.as_i64() {
                Value::Integer(i.into())
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => Value::Text(s.clone()),
        serde_json::Value::Array(items) => {
            Value::Array(items.iter().map(json_to_cbor_value).collect())
        }
        serde_json::Value::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (Value::Text(k.clone()), json_to_cbor_value(v)))
                .collect(),
        ),
    }
}

/// Recursively encode a CBOR value.
fn encode_value_to(buf: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(i) => encode_integer(buf, *i),
        Value::Bytes(b) => {
            encode_uint(buf, 2, b.len() as u64);
            buf.extend_from_slice(b);
        }
        Value::Text(s) => encode_text(buf, s),
        Value::Array(arr) => {
            encode_uint(buf, 4, arr.len() as u64);
            for item in arr {
                encode_value_to(buf, item);
            }
        }
        Value::Map(entries) => encode_map_canonical(buf, entries),
        Value::Bool(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Float(f) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        // Tags never come out of JSON.
        _ => buf.push(0xf6),
    }
}

/// Encode a CBOR integer (major types 0 and 1).
fn encode_integer(buf: &mut Vec<u8>, i: ciborium::value::Integer) {
    let n: i128 = i.into();
    if n >= 0 {
        encode_uint(buf, 0, n as u64);
    } else {
        // CBOR encodes -1 as 0, -2 as 1, etc.
        encode_uint(buf, 1, (-1 - n) as u64);
    }
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffff_ffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Encode a map with keys sorted by their encoded bytes.
fn encode_map_canonical(buf: &mut Vec<u8>, entries: &[(Value, Value)]) {
    let mut pairs: Vec<(Vec<u8>, &Value)> = entries
        .iter()
        .map(|(k, v)| {
            let mut key_buf = Vec::new();
            encode_value_to(&mut key_buf, k);
            (key_buf, v)
        })
        .collect();

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    encode_uint(buf, 5, pairs.len() as u64);
    for (key_bytes, value) in pairs {
        buf.extend_from_slice(&key_bytes);
        encode_value_to(buf, value);
    }
}
