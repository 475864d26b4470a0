//! # Cryptographic Primitives for Lemo
//!
//! Everything the client needs to produce transactions the ledger accepts:
//!
//! - **Keccak-256** for transaction identities, signing digests and
//!   address derivation.
//! - **secp256k1** recoverable ECDSA, so a signature alone is enough to
//!   tell who signed.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Curve arithmetic is libsecp256k1 and the digest is the `sha3`
//! crate. The arbitrary-precision curve parameters in [`curve`] exist only
//! for range checks, never for arithmetic on secrets.

pub mod curve;
pub mod hash;
pub mod keys;
pub mod signatures;

pub use curve::{secp256k1, CurveParams};
pub use hash::{keccak256, Hash};
pub use keys::{KeyError, LemoKeypair};
pub use signatures::{validate_signature_values, Signature, SignatureError, Signer};
