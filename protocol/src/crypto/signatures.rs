//! # Recoverable ECDSA Signatures
//!
//! Lemo transactions do not carry public keys. Instead every signature is
//! *recoverable*: given the signed digest and the 65-byte `[R || S || V]`
//! signature, anyone can reconstruct the signer's public key and from it
//! the signer's address. This module owns that round trip.
//!
//! ## Malleability
//!
//! For any valid ECDSA signature `(r, s)`, the pair `(r, N - s)` is also
//! valid for the same key and digest. If both were accepted, a third party
//! could rewrite a signature without the key and thereby change the
//! transaction's identity hash. [`validate_signature_values`] therefore
//! only accepts the low half of the S range, and libsecp256k1 only ever
//! produces signatures in that half.

use num_bigint::BigUint;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{All, Message, Secp256k1, SecretKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use super::curve::{self, CurveParams};
use super::keys::LemoKeypair;
use crate::config::{HASH_LENGTH, SIGNATURE_LENGTH, UNCOMPRESSED_PUBKEY_LENGTH};

/// Errors during signing and public-key recovery.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// r, s or the recovery bit is outside the accepted range, or the
    /// signature is not 65 bytes long.
    #[error("invalid signature values")]
    ValuesInvalid,

    /// A signer list was empty where at least one signature is required.
    #[error("no signature data")]
    DataMissing,

    /// Recovery failed or produced something that is not an uncompressed
    /// curve point.
    #[error("invalid public key")]
    PublicKeyInvalid,

    /// Only 32-byte digests are signed.
    #[error("digest must be exactly 32 bytes, got {0}")]
    DigestLengthInvalid(usize),

    /// The secret scalar was rejected by the curve library.
    #[error("invalid secret key")]
    InvalidSecretKey,
}

// ---------------------------------------------------------------------------
// Signature
// ---------------------------------------------------------------------------

/// A 65-byte recoverable signature in `[R || S || V]` layout, `V ∈ {0, 1}`.
///
/// Construction from untrusted bytes only checks the length. Range checks
/// happen in [`validate_signature_values`], which recovery always runs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LENGTH]);

impl Signature {
    /// Wraps a 65-byte signature.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SignatureError> {
        let arr: [u8; SIGNATURE_LENGTH] =
            bytes.try_into().map_err(|_| SignatureError::ValuesInvalid)?;
        Ok(Self(arr))
    }

    /// Raw `[R || S || V]` bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// The r component.
    pub fn r(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0[..32])
    }

    /// The s component.
    pub fn s(&self) -> BigUint {
        BigUint::from_bytes_be(&self.0[32..64])
    }

    /// The recovery identifier byte.
    pub fn recovery_id(&self) -> u8 {
        self.0[64]
    }

    /// Low bit of the recovery identifier, the part that is folded into a
    /// transaction's packed V value.
    pub fn recovery_bit(&self) -> u8 {
        self.0[64] & 1
    }

    /// `0x`-prefixed lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parses a 130-character hex signature, with or without `0x`.
    pub fn from_hex(s: &str) -> Result<Self, SignatureError> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|_| SignatureError::ValuesInvalid)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Signature::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Range validation
// ---------------------------------------------------------------------------

/// Checks that `(v, r, s)` could be a canonical signature.
///
/// Accepts `1 <= r < N`, `1 <= s <= N/2` and `v ∈ {0, 1}`. The upper half of
/// the S range is rejected so each logical signature has exactly one
/// encoding.
pub fn validate_signature_values(v: u8, r: &BigUint, s: &BigUint) -> bool {
    let params = curve::secp256k1();
    let one = BigUint::from(1u8);
    if r < &one || s < &one {
        return false;
    }
    if s > &params.half_n {
        return false;
    }
    r < &params.n && s < &params.n && (v == 0 || v == 1)
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Signing and recovery context.
///
/// Holds the libsecp256k1 context (precomputed tables, expensive to build)
/// and the curve parameters. Build one at startup and pass it by reference;
/// it is `Send + Sync` and all methods take `&self`.
///
/// # Example
///
/// ```
/// use lemo_protocol::crypto::{keccak256, LemoKeypair, Signer};
/// use lemo_protocol::identity::Address;
///
/// let signer = Signer::new();
/// let kp = LemoKeypair::generate();
/// let digest = keccak256(b"pay alice");
///
/// let sig = signer.sign(digest.as_bytes(), &kp).unwrap();
/// let pubkey = signer.recover(digest.as_bytes(), &sig).unwrap();
/// assert_eq!(Address::from_public_key(&pubkey), kp.address());
/// ```
#[derive(Clone)]
pub struct Signer {
    secp: Secp256k1<All>,
    params: &'static CurveParams,
}

impl Signer {
    /// Creates a context bound to the process-wide secp256k1 parameters.
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
            params: curve::secp256k1(),
        }
    }

    /// The curve parameters this signer validates against.
    pub fn params(&self) -> &'static CurveParams {
        self.params
    }

    /// Signs a 32-byte digest, returning `[R || S || V]` with low S.
    ///
    /// The working copy of the secret scalar is wiped before returning.
    pub fn sign(&self, digest: &[u8], keypair: &LemoKeypair) -> Result<Signature, SignatureError> {
        if digest.len() != HASH_LENGTH {
            return Err(SignatureError::DigestLengthInvalid(digest.len()));
        }
        let message =
            Message::from_digest_slice(digest).map_err(|_| SignatureError::ValuesInvalid)?;

        let mut seckey = {
            let scalar = keypair.secret_bytes();
            SecretKey::from_slice(&scalar[..]).map_err(|_| SignatureError::InvalidSecretKey)?
        };
        let recoverable = self.secp.sign_ecdsa_recoverable(&message, &seckey);
        seckey.non_secure_erase();

        let (recid, compact) = recoverable.serialize_compact();
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..64].copy_from_slice(&compact);
        out[64] = recid.to_i32() as u8;
        Ok(Signature(out))
    }

    /// Recovers the uncompressed public key (`0x04 || X || Y`) that produced
    /// `signature` over `digest`.
    pub fn recover(
        &self,
        digest: &[u8],
        signature: &Signature,
    ) -> Result<[u8; UNCOMPRESSED_PUBKEY_LENGTH], SignatureError> {
        if digest.len() != HASH_LENGTH {
            return Err(SignatureError::DigestLengthInvalid(digest.len()));
        }
        let v = signature.recovery_id();
        if !validate_signature_values(v, &signature.r(), &signature.s()) {
            return Err(SignatureError::ValuesInvalid);
        }

        let message =
            Message::from_digest_slice(digest).map_err(|_| SignatureError::ValuesInvalid)?;
        let recid = RecoveryId::from_i32(v as i32).map_err(|_| SignatureError::ValuesInvalid)?;
        let recoverable = RecoverableSignature::from_compact(&signature.as_bytes()[..64], recid)
            .map_err(|_| SignatureError::ValuesInvalid)?;

        let public = self
            .secp
            .recover_ecdsa(&message, &recoverable)
            .map_err(|_| SignatureError::PublicKeyInvalid)?;
        let bytes = public.serialize_uncompressed();

        if self.params.unmarshal(&bytes).is_none() {
            return Err(SignatureError::PublicKeyInvalid);
        }
        Ok(bytes)
    }

    /// `true` if `signature` over `digest` recovers to `public_key`.
    pub fn verify(&self, digest: &[u8], signature: &Signature, public_key: &[u8]) -> bool {
        self.recover(digest, signature)
            .map(|recovered| recovered.as_slice() == public_key)
            .unwrap_or(false)
    }
}

impl Default for Signer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer")
            .field("bit_size", &self.params.bit_size)
            .finish()
    }
}
