// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Lemo Protocol — Client Library
//!
//! Everything a program needs to talk to a Lemo ledger without running one:
//! account addresses, canonical transaction hashing, secp256k1 signing and
//! recovery, the ledger's wire formats, and a rate-limited test-coin faucet
//! built on top of them.
//!
//! ## Architecture
//!
//! - **config** — Protocol constants and faucet defaults.
//! - **crypto** — Keccak-256, secp256k1 keys, recoverable signatures.
//! - **identity** — 20-byte addresses and their branded `Lemo…` text form.
//! - **encoding** — RLP and the hex/decimal JSON quantity formats.
//! - **transaction** — Build, hash, sign, countersign, verify, encode.
//! - **storage** — Per-address timestamps (sled or in-memory).
//! - **network** — JSON-RPC client for a ledger node.
//! - **faucet** — The dispensing policy tying it all together.
//!
//! ## Ground Rules
//!
//! 1. Hashes are consensus. Field order, integer encoding and address
//!    derivation must match the ledger byte for byte.
//! 2. Secrets never leave [`crypto::LemoKeypair`] except as zeroizing
//!    buffers.
//! 3. Nothing panics on untrusted input: every decoder returns a `Result`.

pub mod config;
pub mod crypto;
pub mod encoding;
pub mod faucet;
pub mod identity;
pub mod network;
pub mod storage;
pub mod transaction;
