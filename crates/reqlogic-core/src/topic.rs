//! Topic hashes used to index channels in the transaction log.
//!
//! Callers tag a request with arbitrary topics (an identity, a string, any
//! JSON value). Only the hash reaches the log.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::canonical::canonical_bytes;
use crate::error::Result;

const TOPIC_DOMAIN: &[u8] = b"reqlogic-topic-v0:";

/// A 32-byte topic hash.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TopicHash(pub [u8; 32]);

impl TopicHash {
    /// Hash any serializable topic through its canonical encoding.
    pub fn of<T: Serialize + ?Sized>(topic: &T) -> Result<Self> {
        Ok(Self::derive(&canonical_bytes(topic)?))
    }

    fn derive(bytes: &[u8]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(TOPIC_DOMAIN);
        hasher.update(bytes);
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> std::result::Result<Self, hex::FromHexError> {
        let bytes = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for TopicHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TopicHash({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for TopicHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

/// Hash every topic in `topics`.
pub fn hash_topics<T: Serialize>(topics: &[T]) -> Result<Vec<TopicHash>> {
    topics.iter().map(TopicHash::of).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;

    #[test]
    fn test_deterministic() {
        assert_eq!(TopicHash::of("invoices").unwrap(), TopicHash::of("invoices").unwrap());
        assert_ne!(TopicHash::of("invoices").unwrap(), TopicHash::of("receipts").unwrap());
    }

    #[test]
    fn test_identity_topic() {
        let a = Identity::ethereum("0xAf083f77F1fFd54218d91491AFD06c9296EaC3ce");
        let b = Identity::ethereum("0x740fc87Bd3f41d07d23A01DEc90623eBC5fed9D6");
        assert_ne!(TopicHash::of(&a).unwrap(), TopicHash::of(&b).unwrap());
    }

    #[test]
    fn test_hex_roundtrip() {
        let hash = TopicHash::of("x").unwrap();
        assert_eq!(TopicHash::from_hex(&hash.to_hex()).unwrap(), hash);
        assert!(TopicHash::from_hex("abcd").is_err());
    }

    #[test]
    fn test_hash_topics() {
        let hashes = hash_topics(&["a", "b"]).unwrap();
        assert_eq!(hashes.len(), 2);
        assert_eq!(hashes[0], TopicHash::of("a").unwrap());
    }
}
