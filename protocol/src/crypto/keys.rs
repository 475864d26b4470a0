//! # Key Management
//!
//! secp256k1 keypairs for Lemo accounts. A keypair is a secret scalar; the
//! public key and the account address are both derived from it on demand.
//!
//! ## Security considerations
//!
//! - Secret keys are erased when the keypair is dropped.
//! - Key generation pulls from `OsRng`.
//! - `Debug` prints the address, never the key. Key bytes are never logged.

use rand::rngs::OsRng;
use rand::RngCore;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::fmt;
use thiserror::Error;
use zeroize::Zeroizing;

use crate::config::{SECRET_KEY_LENGTH, UNCOMPRESSED_PUBKEY_LENGTH};
use crate::identity::Address;

/// Errors that can occur during key operations.
///
/// Deliberately uninformative about the key material itself.
#[derive(Debug, Error)]
pub enum KeyError {
    #[error("invalid secret key: expected 32 bytes encoding a scalar in [1, N)")]
    InvalidSecretKey,
}

/// A Lemo account keypair.
///
/// `LemoKeypair` intentionally does not implement `Serialize`. Exporting a
/// secret key is an explicit act through [`secret_key_hex`](Self::secret_key_hex).
///
/// # Examples
///
/// ```
/// use lemo_protocol::crypto::LemoKeypair;
///
/// let kp = LemoKeypair::generate();
/// let address = kp.address();
/// assert!(address.to_branded().starts_with("Lemo"));
/// ```
pub struct LemoKeypair {
    secret: SecretKey,
    public: PublicKey,
}

impl LemoKeypair {
    /// Generate a fresh keypair from the OS RNG.
    pub fn generate() -> Self {
        let mut seed = Zeroizing::new([0u8; SECRET_KEY_LENGTH]);
        loop {
            OsRng.fill_bytes(&mut seed[..]);
            // Rejects zero and values >= N; both happen with probability ~2^-128.
            if let Ok(kp) = Self::from_bytes(&seed[..]) {
                return kp;
            }
        }
    }

    /// Reconstruct a keypair from a raw 32-byte big-endian scalar.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let secret = SecretKey::from_slice(bytes).map_err(|_| KeyError::InvalidSecretKey)?;
        let public = PublicKey::from_secret_key(&Secp256k1::signing_only(), &secret);
        Ok(Self { secret, public })
    }

    /// Reconstruct a keypair from hex, with or without `0x`.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let trimmed = hex_str.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes =
            Zeroizing::new(hex::decode(stripped).map_err(|_| KeyError::InvalidSecretKey)?);
        Self::from_bytes(&bytes)
    }

    /// The 65-byte uncompressed public key (`0x04 || X || Y`).
    pub fn public_key_uncompressed(&self) -> [u8; UNCOMPRESSED_PUBKEY_LENGTH] {
        self.public.serialize_uncompressed()
    }

    /// The account address controlled by this keypair.
    pub fn address(&self) -> Address {
        Address::from_public_key(&self.public_key_uncompressed())
    }

    /// Secret scalar bytes, wrapped so the copy is wiped when dropped.
    pub fn secret_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LENGTH]> {
        Zeroizing::new(self.secret.secret_bytes())
    }

    /// `0x`-prefixed hex of the secret scalar.
    ///
    /// **Handle with care.** Whoever holds this string owns the account.
    pub fn secret_key_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.secret_bytes()[..]))
    }
}

impl Clone for LemoKeypair {
    fn clone(&self) -> Self {
        Self {
            secret: self.secret,
            public: self.public,
        }
    }
}

impl Drop for LemoKeypair {
    fn drop(&mut self) {
        self.secret.non_secure_erase();
    }
}

impl fmt::Debug for LemoKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LemoKeypair({})", self.address())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Faucet account of the Lemo test network.
    const FAUCET_KEY: &str = "c21b6b2fbf230f665b936194d14da67187732bf9d28768aef1a3cbb26608f8aa";

    #[test]
    fn known_key_maps_to_known_address() {
        let kp = LemoKeypair::from_hex(FAUCET_KEY).unwrap();
        assert_eq!(
            kp.address().to_branded(),
            "Lemo83GN72GYH2NZ8BA729Z9TCT7KQ5FC3CR6DJG"
        );
        assert_eq!(
            kp.address().to_hex(),
            "0x015780f8456f9c1532645087a19dcf9a7e0c7f97"
        );
    }

    #[test]
    fn hex_prefix_is_optional() {
        let a = LemoKeypair::from_hex(FAUCET_KEY).unwrap();
        let b = LemoKeypair::from_hex(&format!("0x{}", FAUCET_KEY)).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn secret_hex_roundtrip() {
        let kp = LemoKeypair::generate();
        let restored = LemoKeypair::from_hex(&kp.secret_key_hex()).unwrap();
        assert_eq!(kp.address(), restored.address());
    }

    #[test]
    fn zero_scalar_rejected() {
        assert!(matches!(
            LemoKeypair::from_bytes(&[0u8; 32]),
            Err(KeyError::InvalidSecretKey)
        ));
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(LemoKeypair::from_bytes(&[1u8; 31]).is_err());
        assert!(LemoKeypair::from_hex("zz").is_err());
    }

    #[test]
    fn public_key_is_uncompressed() {
        let kp = LemoKeypair::generate();
        let pk = kp.public_key_uncompressed();
        assert_eq!(pk[0], 0x04);
        assert!(PublicKey::from_slice(&pk).is_ok());
        assert_eq!(Address::from_public_key(&pk), kp.address());
    }

    #[test]
    fn debug_does_not_leak_secret() {
        let kp = LemoKeypair::from_hex(FAUCET_KEY).unwrap();
        let dbg = format!("{:?}", kp);
        assert!(!dbg.contains(FAUCET_KEY));
        assert!(dbg.contains("Lemo"));
    }
}
