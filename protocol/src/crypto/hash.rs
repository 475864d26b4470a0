//! # Hashing Utilities
//!
//! Keccak-256 is the only digest the Lemo ledger understands. Transaction
//! identities, signing digests and address derivation all go through it.
//!
//! Note the name: this is the *original* Keccak submission with its
//! `0x01` padding byte, not the NIST-standardized SHA3-256 (padding
//! `0x06`). The two produce completely different digests for the same
//! input, and mixing them up is the classic way to end up with addresses
//! nobody can spend from. `sha3::Keccak256` is the right one; `Sha3_256`
//! is not.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;

use crate::config::HASH_LENGTH;

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// A 32-byte Keccak-256 digest.
///
/// Immutable and `Copy`. The text form is `0x` followed by 64 lowercase hex
/// characters, both for `Display` and for serde.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Hash([u8; HASH_LENGTH]);

impl Hash {
    /// The all-zero digest. Never the output of Keccak-256 in practice,
    /// so it is a safe "not computed" sentinel in logs.
    pub const ZERO: Hash = Hash([0u8; HASH_LENGTH]);

    /// Wraps raw digest bytes.
    pub const fn from_bytes(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Returns the digest bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses a 64-character hex digest, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let stripped = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        let mut out = [0u8; HASH_LENGTH];
        hex::decode_to_slice(stripped, &mut out)?;
        Ok(Self(out))
    }
}

impl AsRef<[u8]> for Hash {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LENGTH]> for Hash {
    fn from(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", self.to_hex())
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Hash::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Digest functions
// ---------------------------------------------------------------------------

/// Compute the Keccak-256 digest of `data`.
///
/// # Example
///
/// ```
/// use lemo_protocol::crypto::keccak256;
///
/// let digest = keccak256(b"");
/// assert_eq!(
///     digest.to_hex(),
///     "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
/// );
/// ```
pub fn keccak256(data: &[u8]) -> Hash {
    let out: [u8; HASH_LENGTH] = Keccak256::digest(data).into();
    Hash(out)
}
