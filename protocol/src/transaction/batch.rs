//! Box transactions: batches of sub-transactions in one envelope.
//!
//! A box carries its sub-transactions as JSON in the payload:
//!
//! ```text
//! {"subTxList": [<transaction JSON>, ...]}
//! ```
//!
//! For hashing, a box's payload is replaced by the Keccak-256 of the RLP
//! list of its sub-transactions' identity hashes, so re-serializing the
//! JSON differently does not change the box's hash. A payload that does
//! not parse, or parses to an empty list, is hashed as raw bytes exactly
//! like an ordinary transaction's payload. That is the ledger's rule, not
//! an error.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use tracing::debug;

use super::builder::Transaction;
use super::types::TransactionType;
use crate::crypto::{keccak256, Hash};
use crate::encoding::rlp;

/// The payload of a [`TransactionType::Box`] transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxPayload {
    #[serde(rename = "subTxList")]
    pub sub_txs: Vec<Transaction>,
}

impl BoxPayload {
    pub fn new(sub_txs: Vec<Transaction>) -> Self {
        Self { sub_txs }
    }

    /// JSON bytes to put in the box transaction's payload.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Parses a payload. `None` if it is not a box.
    pub fn parse(data: &[u8]) -> Option<Self> {
        match serde_json::from_slice(data) {
            Ok(payload) => Some(payload),
            Err(e) => {
                debug!(error = %e, "box payload did not parse, hashing raw bytes");
                None
            }
        }
    }

    /// Keccak-256 of the RLP list of sub-transaction identity hashes.
    pub fn content_hash(&self) -> Hash {
        let items: Vec<Vec<u8>> = self
            .sub_txs
            .iter()
            .map(|tx| rlp::encode_bytes(tx.identity_hash().as_bytes()))
            .collect();
        keccak256(&rlp::encode_list(&items))
    }
}

/// The bytes that stand in for the payload when hashing a transaction.
pub(super) fn hashed_content(tx_type: TransactionType, data: &[u8]) -> Cow<'_, [u8]> {
    if tx_type != TransactionType::Box {
        return Cow::Borrowed(data);
    }
    match BoxPayload::parse(data) {
        Some(payload) if !payload.sub_txs.is_empty() => {
            Cow::Owned(payload.content_hash().as_bytes().to_vec())
        }
        Some(_) => {
            debug!("box payload has no sub-transactions, hashing raw bytes");
            Cow::Borrowed(data)
        }
        None => Cow::Borrowed(data),
    }
}
