//! # Lemo Addresses
//!
//! An address is 20 bytes. People see it in branded form:
//!
//! ```text
//! address (20 bytes)
//!     -> address || XOR(address bytes)       21 bytes
//!     -> base-26, fixed width                36 chars
//!     -> "Lemo" + base-26                    Lemo83GN72GYH2NZ8BA729Z9TCT7KQ5FC3CR6DJG
//! ```
//!
//! The one-byte XOR checksum catches every single-bit typo. It is not a
//! cryptographic checksum and does not pretend to be.
//!
//! Addresses of accounts are derived from public keys: Keccak-256 of the
//! 64-byte `X || Y`, first 19 bytes, with version byte `0x01` in front.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::base26;
use crate::config::{ADDRESS_BRAND, ADDRESS_HASH_BYTES, ADDRESS_LENGTH, ADDRESS_VERSION};
use crate::crypto::hash::keccak256;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while parsing an address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The branded text decoded fine but its checksum byte is wrong.
    #[error("address checksum mismatch")]
    ChecksumMismatch,

    /// Wrong brand, bad base-26 character, or malformed hex.
    #[error("invalid address format: {0}")]
    FormatInvalid(String),
}

// ---------------------------------------------------------------------------
// Address
// ---------------------------------------------------------------------------

/// A 20-byte Lemo account address.
///
/// # Examples
///
/// ```
/// use lemo_protocol::identity::Address;
///
/// let addr: Address = "Lemo83W7HDZYS33Z745NZ2FGF37565DSF5AHJZ4J".parse().unwrap();
/// assert_eq!(addr.to_hex(), "0x01aa3babd3ffbb84a6281a7ad6a41ee06cb7f5db");
///
/// // Hex is accepted too, and both forms name the same account.
/// let same: Address = "0x01aa3babd3ffbb84a6281a7ad6a41ee06cb7f5db".parse().unwrap();
/// assert_eq!(addr, same);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// The all-zero address, which is also what an empty branded body
    /// decodes to.
    pub const ZERO: Address = Address([0u8; ADDRESS_LENGTH]);

    /// Wraps raw address bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Builds an address from a slice. Shorter input is right-aligned;
    /// longer input keeps its last 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Self {
        let mut out = [0u8; ADDRESS_LENGTH];
        if bytes.len() >= ADDRESS_LENGTH {
            out.copy_from_slice(&bytes[bytes.len() - ADDRESS_LENGTH..]);
        } else {
            out[ADDRESS_LENGTH - bytes.len()..].copy_from_slice(bytes);
        }
        Self(out)
    }

    /// Raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// `true` for [`Address::ZERO`].
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LENGTH]
    }

    /// Derives the address controlled by an uncompressed public key
    /// (`0x04 || X || Y`). The format byte is skipped; any input without
    /// one is hashed as given.
    pub fn from_public_key(pubkey: &[u8]) -> Self {
        let body = match pubkey.split_first() {
            Some((_, rest)) if pubkey.len() == 65 => rest,
            _ => pubkey,
        };
        let digest = keccak256(body);
        let mut out = [0u8; ADDRESS_LENGTH];
        out[0] = ADDRESS_VERSION;
        out[1..].copy_from_slice(&digest.as_bytes()[..ADDRESS_HASH_BYTES]);
        Self(out)
    }

    /// XOR of all address bytes.
    pub fn checksum(&self) -> u8 {
        xor_checksum(&self.0)
    }

    /// Branded, checksummed text form.
    pub fn to_branded(&self) -> String {
        let mut payload = [0u8; ADDRESS_LENGTH + 1];
        payload[..ADDRESS_LENGTH].copy_from_slice(&self.0);
        payload[ADDRESS_LENGTH] = self.checksum();
        format!("{}{}", ADDRESS_BRAND, base26::encode(&payload))
    }

    /// Parses the branded form. The brand is matched case-insensitively
    /// and the body is upper-cased before decoding.
    pub fn decode_branded(text: &str) -> Result<Self, AddressError> {
        let brand_len = ADDRESS_BRAND.len();
        let brand = text
            .get(..brand_len)
            .filter(|b| b.eq_ignore_ascii_case(ADDRESS_BRAND))
            .ok_or_else(|| {
                AddressError::FormatInvalid(format!("missing {} prefix", ADDRESS_BRAND))
            })?;
        let body = text[brand.len()..].to_ascii_uppercase();

        let decoded = base26::decode(&body)
            .map_err(|e| AddressError::FormatInvalid(e.to_string()))?;
        let Some((&checksum, payload)) = decoded.split_last() else {
            return Ok(Self::ZERO);
        };

        if xor_checksum(payload) != checksum {
            return Err(AddressError::ChecksumMismatch);
        }
        Ok(Self::from_slice(payload))
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses exactly 40 hex characters, with or without `0x`.
    pub fn from_hex(text: &str) -> Result<Self, AddressError> {
        let stripped = text
            .strip_prefix("0x")
            .or_else(|| text.strip_prefix("0X"))
            .unwrap_or(text);
        if stripped.len() != ADDRESS_LENGTH * 2 {
            return Err(AddressError::FormatInvalid(format!(
                "expected {} hex characters, got {}",
                ADDRESS_LENGTH * 2,
                stripped.len()
            )));
        }
        let mut out = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(stripped, &mut out)
            .map_err(|e| AddressError::FormatInvalid(e.to_string()))?;
        Ok(Self(out))
    }

    /// Parses user input in either form. Text that starts with the brand
    /// is treated as branded; anything else must be hex.
    pub fn parse(text: &str) -> Result<Self, AddressError> {
        let text = text.trim();
        let branded = text
            .get(..ADDRESS_BRAND.len())
            .map(|p| p.eq_ignore_ascii_case(ADDRESS_BRAND))
            .unwrap_or(false);
        if branded {
            Self::decode_branded(text)
        } else {
            Self::from_hex(text)
        }
    }
}

fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc ^ b)
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_branded())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_branded())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_branded())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::parse(&s).map_err(serde::de::Error::custom)
    }
}
