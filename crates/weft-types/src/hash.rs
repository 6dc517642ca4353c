use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Number of raw bytes in an [`ObjectHash`] (160 bits, 40 hex characters).
pub const HASH_LEN: usize = 20;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectHash` is the BLAKE3 hash of an object's canonical bytes,
/// truncated to 160 bits so it renders as a 40-character hex string.
/// Identical content always produces the same `ObjectHash`, making objects
/// deduplicatable and verifiable; objects are never updated in place, only
/// created under new hashes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHash([u8; HASH_LEN]);

impl ObjectHash {
    /// Compute an `ObjectHash` from raw bytes.
    pub fn of_bytes(data: &[u8]) -> Self {
        let digest = blake3::hash(data);
        let mut raw = [0u8; HASH_LEN];
        raw.copy_from_slice(&digest.as_bytes()[..HASH_LEN]);
        Self(raw)
    }

    /// Create an `ObjectHash` from a pre-computed 160-bit digest.
    pub const fn from_raw(raw: [u8; HASH_LEN]) -> Self {
        Self(raw)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Hex-encoded string representation (40 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 9 characters, like a short commit id).
    pub fn short_hex(&self) -> String {
        let mut s = hex::encode(self.0);
        s.truncate(9);
        s
    }

    /// Parse from a 40-character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != HASH_LEN {
            return Err(TypeError::InvalidLength {
                expected: HASH_LEN,
                actual: bytes.len(),
            });
        }
        let mut raw = [0u8; HASH_LEN];
        raw.copy_from_slice(&bytes);
        Ok(Self(raw))
    }
}

impl fmt::Debug for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectHash({})", self.short_hex())
    }
}

impl fmt::Display for ObjectHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; HASH_LEN]> for ObjectHash {
    fn from(raw: [u8; HASH_LEN]) -> Self {
        Self(raw)
    }
}
