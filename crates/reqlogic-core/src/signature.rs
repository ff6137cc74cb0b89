//! Signatures over canonical action data.
//!
//! Signing and recovery operate on the normalized digest of the data (see
//! [`crate::canonical::normalized_digest`]), so any JSON encoding of the same
//! data verifies against the same signature.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;

use crate::canonical::normalized_digest;
use crate::crypto::{recover_address, EcdsaKeypair, RECOVERABLE_SIGNATURE_LEN};
use crate::error::{LogicError, Result};
use crate::identity::{Identity, IdentityType};

/// Signature method. Only `ecdsa` is supported.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SignatureMethod {
    Ecdsa,
    Other(String),
}

impl SignatureMethod {
    pub fn as_str(&self) -> &str {
        match self {
            SignatureMethod::Ecdsa => "ecdsa",
            SignatureMethod::Other(s) => s,
        }
    }
}

impl Serialize for SignatureMethod {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SignatureMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            "ecdsa" => SignatureMethod::Ecdsa,
            _ => SignatureMethod::Other(s),
        })
    }
}

/// `{ method, value }` as carried on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub method: SignatureMethod,
    pub value: String,
}

/// Key material for [`sign`].
#[derive(Clone)]
pub struct SignatureParameters {
    pub method: SignatureMethod,
    pub private_key: String,
}

impl SignatureParameters {
    pub fn ecdsa(private_key: impl Into<String>) -> Self {
        Self {
            method: SignatureMethod::Ecdsa,
            private_key: private_key.into(),
        }
    }
}

impl std::fmt::Debug for SignatureParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SignatureParameters({}, <redacted>)", self.method.as_str())
    }
}

fn unsupported(method: &SignatureMethod) -> LogicError {
    LogicError::UnsupportedMethod(format!(
        "signing method not supported: {}",
        method.as_str()
    ))
}

/// Sign the normalized digest of `data`.
pub fn sign<T: Serialize + ?Sized>(data: &T, params: &SignatureParameters) -> Result<Signature> {
    match &params.method {
        SignatureMethod::Ecdsa => {
            let keypair = EcdsaKeypair::from_hex(&params.private_key)?;
            sign_with_keypair(data, &keypair)
        }
        other => Err(unsupported(other)),
    }
}

/// Sign with an already parsed keypair.
pub fn sign_with_keypair<T: Serialize + ?Sized>(
    data: &T,
    keypair: &EcdsaKeypair,
) -> Result<Signature> {
    let digest = normalized_digest(data)?;
    Ok(Signature {
        method: SignatureMethod::Ecdsa,
        value: format!("0x{}", hex::encode(keypair.sign_digest(&digest))),
    })
}

/// Recover the identity that signed `data`.
pub fn recover<T: Serialize + ?Sized>(data: &T, signature: &Signature) -> Result<Identity> {
    match &signature.method {
        SignatureMethod::Ecdsa => {
            let bytes = decode_signature_value(&signature.value)?;
            let digest = normalized_digest(data)?;
            Ok(Identity::ethereum(recover_address(&digest, &bytes)?))
        }
        other => Err(unsupported(other)),
    }
}

/// Decode `0x` + lowercase hex of r ‖ s ‖ v, the only spelling accepted.
fn decode_signature_value(value: &str) -> Result<Vec<u8>> {
    let digits = value
        .strip_prefix("0x")
        .filter(|d| d.len() == 2 * RECOVERABLE_SIGNATURE_LEN)
        .filter(|d| d.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')))
        .ok_or_else(|| {
            LogicError::Crypto(format!(
                "signature value must be 0x and {} lowercase hex digits",
                2 * RECOVERABLE_SIGNATURE_LEN
            ))
        })?;
    hex::decode(digits).map_err(|e| LogicError::Crypto(format!("invalid signature value: {}", e)))
}

/// Produces signatures on behalf of identities whose keys it holds.
pub trait SignatureProvider: Send + Sync {
    /// Identity types this provider can sign for.
    fn supported_identity_types(&self) -> Vec<IdentityType>;

    /// Sign `data` as `signer`.
    fn sign(&self, data: &serde_json::Value, signer: &Identity) -> Result<Signature>;
}

/// In-memory ECDSA provider keyed by Ethereum address.
#[derive(Default, Clone)]
pub struct EcdsaSignatureProvider {
    keys: HashMap<String, EcdsaKeypair>,
}

impl EcdsaSignatureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a private key and return the identity it signs as.
    pub fn add_signature_parameters(&mut self, params: &SignatureParameters) -> Result<Identity> {
        if params.method != SignatureMethod::Ecdsa {
            return Err(unsupported(&params.method));
        }
        let keypair = EcdsaKeypair::from_hex(&params.private_key)?;
        Ok(self.add_keypair(keypair))
    }

    pub fn add_keypair(&mut self, keypair: EcdsaKeypair) -> Identity {
        let address = keypair.address();
        self.keys.insert(address.clone(), keypair);
        Identity::ethereum(address)
    }

    pub fn remove(&mut self, identity: &Identity) {
        self.keys.remove(&identity.value.to_lowercase());
    }

    pub fn identities(&self) -> Vec<Identity> {
        self.keys.keys().map(Identity::ethereum).collect()
    }
}

impl SignatureProvider for EcdsaSignatureProvider {
    fn supported_identity_types(&self) -> Vec<IdentityType> {
        vec![IdentityType::EthereumAddress]
    }

    fn sign(&self, data: &serde_json::Value, signer: &Identity) -> Result<Signature> {
        if !signer.kind.is_supported() {
            return Err(LogicError::UnsupportedMethod(format!(
                "identity type not supported: {}",
                signer.kind.as_str()
            )));
        }
        let keypair = self
            .keys
            .get(&signer.value.to_lowercase())
            .ok_or_else(|| LogicError::Crypto(format!("private key not found for {}", signer)))?;
        sign_with_keypair(data, keypair)
    }
}
