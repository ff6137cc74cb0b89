//! Golden test vectors for deterministic verification.
//!
//! Canonical encodings, Keccak-256 digests and address derivations that every
//! implementation must reproduce byte for byte.

use serde_json::{json, Value};

use reqlogic_core::canonical::canonical_json_bytes;
use reqlogic_core::crypto::keccak256;
use reqlogic_core::EcdsaKeypair;

/// A JSON value and its expected canonical CBOR encoding.
#[derive(Debug, Clone)]
pub struct CanonicalVector {
    pub name: &'static str,
    pub value: Value,
    /// Expected canonical bytes (hex).
    pub expected_cbor: &'static str,
}

/// A private key and the address it signs as.
#[derive(Debug, Clone)]
pub struct AddressVector {
    pub private_key: &'static str,
    pub expected_address: &'static str,
}

/// Input bytes and their Keccak-256 digest.
#[derive(Debug, Clone)]
pub struct KeccakVector {
    pub input: &'static [u8],
    pub expected_digest: &'static str,
}

pub fn canonical_vectors() -> Vec<CanonicalVector> {
    vec![
        CanonicalVector {
            name: "small integer",
            value: json!(1),
            expected_cbor: "01",
        },
        CanonicalVector {
            name: "two-byte integer",
            value: json!(1000),
            expected_cbor: "1903e8",
        },
        CanonicalVector {
            name: "timestamp",
            value: json!(1_544_426_030u64),
            expected_cbor: "1a5c0e122e",
        },
        CanonicalVector {
            name: "negative integer",
            value: json!(-1),
            expected_cbor: "20",
        },
        CanonicalVector {
            name: "float",
            value: json!(1.5),
            expected_cbor: "fb3ff8000000000000",
        },
        CanonicalVector {
            name: "currency code",
            value: json!("ETH"),
            expected_cbor: "63455448",
        },
        CanonicalVector {
            name: "simple values",
            value: json!([true, false, null]),
            expected_cbor: "83f5f4f6",
        },
        CanonicalVector {
            name: "keys sorted",
            value: json!({ "b": 1, "a": 2 }),
            expected_cbor: "a2616102616201",
        },
        CanonicalVector {
            name: "shorter keys first",
            value: json!({ "aa": 1, "b": 2 }),
            expected_cbor: "a261620262616101",
        },
        CanonicalVector {
            name: "nested",
            value: json!({ "x": [1, "y"] }),
            expected_cbor: "a1617882016179",
        },
    ]
}

pub fn address_vectors() -> Vec<AddressVector> {
    vec![
        AddressVector {
            private_key: "0x0000000000000000000000000000000000000000000000000000000000000001",
            expected_address: "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf",
        },
        AddressVector {
            private_key: "0x0000000000000000000000000000000000000000000000000000000000000002",
            expected_address: "0x2b5ad5c4795c026514f8317c7a215e218dccd6cf",
        },
        AddressVector {
            private_key: "0x4f3edf983ac636a65a842ce7c78d9aa706d3b113bce9c46f30d7d21715b23b1d",
            expected_address: "0x90f8bf6a479f320ead074411a4b0e7944ea8c9c1",
        },
        AddressVector {
            private_key: "0x6cbed15c793ce57650b9877cf6fa156fbef513c4e6134f022a85b1ffdd59b2a1",
            expected_address: "0xffcf8fdee72ac11b5c542428b35eef5769c409f0",
        },
    ]
}

pub fn keccak_vectors() -> Vec<KeccakVector> {
    vec![
        KeccakVector {
            input: b"",
            expected_digest: "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470",
        },
        KeccakVector {
            input: b"abc",
            expected_digest: "4e03657aea45a94fc7d47ba826c8d667c0d1e6e33a64a036ec44f58fa12d6c45",
        },
    ]
}

/// Check every vector, returning a description of each mismatch.
pub fn verify_all_vectors() -> Vec<String> {
    let mut failures = Vec::new();

    for vector in canonical_vectors() {
        let got = hex::encode(canonical_json_bytes(&vector.value));
        if got != vector.expected_cbor {
            failures.push(format!(
                "{}: expected {}, got {}",
                vector.name, vector.expected_cbor, got
            ));
        }
    }

    for vector in address_vectors() {
        match EcdsaKeypair::from_hex(vector.private_key) {
            Ok(keypair) if keypair.address() == vector.expected_address => {}
            Ok(keypair) => failures.push(format!(
                "{}: expected {}, got {}",
                vector.private_key,
                vector.expected_address,
                keypair.address()
            )),
            Err(e) => failures.push(format!("{}: {}", vector.private_key, e)),
        }
    }

    for vector in keccak_vectors() {
        let got = hex::encode(keccak256(vector.input));
        if got != vector.expected_digest {
            failures.push(format!("keccak({:?}): got {}", vector.input, got));
        }
    }

    failures
}
