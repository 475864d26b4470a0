//! # Storage Module
//!
//! Persistence for the faucet's throttle state: one timestamp per
//! recipient address.
//!
//! ## Design Decisions
//!
//! 1. **sled for the real thing.** Embedded, crash-safe, no server to run.
//!    Values are big-endian u64 so sled's byte ordering matches numeric
//!    ordering.
//!
//! 2. **A trait at the seam.** The dispensing policy only sees
//!    [`TimestampStore`], so tests swap in the in-memory store and never
//!    touch the filesystem.

pub mod timestamps;

pub use timestamps::{MemoryTimestampStore, SledTimestampStore, StoreError, TimestampStore};
