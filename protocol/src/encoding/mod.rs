//! # Encoding
//!
//! Byte-exact formats shared with the ledger: RLP for hashing and the wire,
//! and the hex conventions of its JSON.

pub mod hexfmt;
pub mod rlp;

pub use rlp::{RlpError, RlpItem};
