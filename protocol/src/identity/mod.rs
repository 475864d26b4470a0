//! # Identity Module
//!
//! Who owns what on the Lemo ledger. Every account is a secp256k1 keypair
//! (see [`crate::crypto::keys`]), and the thing users actually see, share
//! and paste into payment fields is its [`Address`].
//!
//! ## Design Decisions
//!
//! - Addresses are plain 20-byte values and `Copy`. Text forms are derived
//!   on demand, never stored.
//! - Branded text is what we print. Hex is accepted on input everywhere a
//!   branded address is, because block explorers and wallets hand it out.
//! - The base-26 codec is kept separate from the address logic so the
//!   fixed-width rule can be tested on its own.

pub mod address;
pub mod base26;

pub use address::{Address, AddressError};
