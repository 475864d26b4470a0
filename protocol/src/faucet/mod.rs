//! # Faucet Module
//!
//! Hands out test-network LEMO, at most once per interval per address.
//!
//! ```text
//! policy.rs    — FaucetConfig and the throttle rule
//! dispenser.rs — Dispenser: parse, throttle, build, sign, submit, record
//! ```
//!
//! The throttle is keyed on the canonical branded address, so a recipient
//! cannot dodge it by switching between branded and hex input or by
//! changing the case of the brand.

pub mod dispenser;
pub mod policy;

pub use dispenser::{Dispenser, DripOutcome, FaucetError};
pub use policy::{retry_after, FaucetConfig};
