//! # Transaction Module
//!
//! Construction, hashing, signing, verification and encoding of Lemo
//! ledger transactions.
//!
//! ## Architecture
//!
//! ```text
//! types.rs        — TransactionType, SigningState, packed V helpers, errors
//! builder.rs      — Transaction, TransactionBuilder, signing and identity hashes
//! batch.rs        — Box payloads and their content hash
//! signing.rs      — Copy-on-sign for signers and gas payers
//! verification.rs — Signer recovery and sender checks
//! codec.rs        — RLP wire form and the ledger's JSON form
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — Use [`TransactionBuilder`] to assemble the fields.
//! 2. **Sign** — [`Transaction::sign`] returns a signed copy; repeat for
//!    multi-signature accounts.
//! 3. **Countersign** — Optionally, [`Transaction::sign_as_gas_payer`].
//! 4. **Submit** — Send [`Transaction::to_json`] to a ledger node.
//!
//! ## Design Decisions
//!
//! - Type, version and chain id are stored as separate fields. The packed
//!   V value the ledger talks about is derived on demand by
//!   [`Transaction::packed_v`].
//! - Amounts and gas prices are arbitrary-precision. Balances of 10^19
//!   base units and up are ordinary.
//! - The identity hash is memoized in a write-once cell. Anything that
//!   changes a transaction produces a new value with an empty cell, so the
//!   cache can never go stale.

pub mod batch;
pub mod builder;
pub mod codec;
pub mod signing;
pub mod types;
pub mod verification;

pub use batch::BoxPayload;
pub use builder::{Transaction, TransactionBuilder};
pub use types::{
    combine_v, set_recovery_bit, split_v, SigningState, TransactionError, TransactionType,
};
