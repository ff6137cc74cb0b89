//! Cryptographic primitives for request logic.
//!
//! Wraps Keccak-256, BLAKE3, and recoverable secp256k1 ECDSA with strong types.

use rand::RngCore;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::error::{LogicError, Result};

/// Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// A 32-byte BLAKE3 content hash, used for deduplication and diffing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    pub fn hash(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Length of a serialized recoverable signature: r ‖ s ‖ v.
pub const RECOVERABLE_SIGNATURE_LEN: usize = 65;

/// Offset added to the recovery id when serializing `v`.
const V_OFFSET: u8 = 27;

/// A secp256k1 keypair able to produce recoverable signatures.
#[derive(Clone)]
pub struct EcdsaKeypair {
    secret: SecretKey,
    public: PublicKey,
}

impl EcdsaKeypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 32];
            rng.fill_bytes(&mut bytes);
            // Out-of-range scalars are astronomically rare; draw again.
            if let Ok(keypair) = Self::from_secret_bytes(&bytes) {
                return keypair;
            }
        }
    }

    /// Create from 32 bytes of secret key material.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret = SecretKey::from_slice(bytes)
            .map_err(|e| LogicError::Crypto(format!("invalid private key: {}", e)))?;
        let public = PublicKey::from_secret_key(&Secp256k1::new(), &secret);
        Ok(Self { secret, public })
    }

    /// Parse a `0x`-prefixed (or bare) hex private key.
    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| LogicError::Crypto(format!("invalid private key: {}", e)))?;
        Self::from_secret_bytes(&bytes)
    }

    /// Lowercase `0x` Ethereum address of the public key.
    pub fn address(&self) -> String {
        address_of(&self.public)
    }

    /// Sign a 32-byte digest, returning r ‖ s ‖ v.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> [u8; RECOVERABLE_SIGNATURE_LEN] {
        let secp = Secp256k1::new();
        let message = Message::from_digest(*digest);
        let signature = secp.sign_ecdsa_recoverable(&message, &self.secret);
        let (recovery_id, compact) = signature.serialize_compact();

        let mut out = [0u8; RECOVERABLE_SIGNATURE_LEN];
        out[..64].copy_from_slice(&compact);
        out[64] = V_OFFSET + recovery_id.to_i32() as u8;
        out
    }
}

impl fmt::Debug for EcdsaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EcdsaKeypair({})", self.address())
    }
}

/// Recover the signer address from a digest and an r ‖ s ‖ v signature.
pub fn recover_address(digest: &[u8; 32], signature: &[u8]) -> Result<String> {
    if signature.len() != RECOVERABLE_SIGNATURE_LEN {
        return Err(LogicError::Crypto(format!(
            "signature must be {} bytes, got {}",
            RECOVERABLE_SIGNATURE_LEN,
            signature.len()
        )));
    }

    let v = signature[64];
    if v != V_OFFSET && v != V_OFFSET + 1 {
        return Err(LogicError::Crypto(format!("invalid recovery byte: {}", v)));
    }
    let recovery_id = RecoveryId::from_i32(i32::from(v - V_OFFSET))
        .map_err(|e| LogicError::Crypto(format!("invalid recovery id: {}", e)))?;
    let recoverable = RecoverableSignature::from_compact(&signature[..64], recovery_id)
        .map_err(|e| LogicError::Crypto(format!("invalid signature: {}", e)))?;

    // Only the low-s form is accepted, so each signature has one encoding.
    let standard = recoverable.to_standard();
    let mut normalized = standard;
    normalized.normalize_s();
    if normalized != standard {
        return Err(LogicError::Crypto("signature s value must be low".into()));
    }

    let secp = Secp256k1::new();
    let public = secp
        .recover_ecdsa(&Message::from_digest(*digest), &recoverable)
        .map_err(|e| LogicError::Crypto(format!("signature recovery failed: {}", e)))?;
    Ok(address_of(&public))
}

fn address_of(public: &PublicKey) -> String {
    let uncompressed = public.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}
