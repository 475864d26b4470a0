//! Core type definitions for Lemo transactions.
//!
//! The type tag, the signing state and the packed V layout. Everything in
//! here is `Copy` and allocation-free.

use std::fmt;
use thiserror::Error;

use crate::crypto::SignatureError;
use crate::encoding::RlpError;
use crate::identity::{Address, AddressError};

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// The operation a transaction represents.
///
/// The ledger defines the numeric tags; unknown tags are carried through
/// as [`TransactionType::Other`] so a newer ledger's transactions still
/// hash and verify correctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Plain value transfer.
    Ordinary,
    /// Contract deployment (recipient absent).
    CreateContract,
    /// Vote for a deputy candidate.
    Vote,
    /// Register as a deputy candidate.
    Register,
    /// Change candidate details.
    ModifyCandidate,
    /// Create an asset class.
    CreateAsset,
    /// Issue units of an asset.
    IssueAsset,
    /// Top up an issued asset.
    ReplenishAsset,
    /// Change asset metadata.
    ModifyAsset,
    /// Transfer units of an asset.
    TransferAsset,
    /// Change the signer set of a multi-signature account.
    ModifySigs,
    /// Batch of sub-transactions carried as JSON in the payload.
    Box,
    /// Any tag this client does not know by name.
    Other(u16),
}

impl TransactionType {
    /// The numeric tag on the wire.
    pub fn code(&self) -> u16 {
        match self {
            Self::Ordinary => 0,
            Self::CreateContract => 1,
            Self::Vote => 2,
            Self::Register => 3,
            Self::ModifyCandidate => 4,
            Self::CreateAsset => 5,
            Self::IssueAsset => 6,
            Self::ReplenishAsset => 7,
            Self::ModifyAsset => 8,
            Self::TransferAsset => 9,
            Self::ModifySigs => 10,
            Self::Box => 11,
            Self::Other(code) => *code,
        }
    }
}

impl From<u16> for TransactionType {
    fn from(code: u16) -> Self {
        match code {
            0 => Self::Ordinary,
            1 => Self::CreateContract,
            2 => Self::Vote,
            3 => Self::Register,
            4 => Self::ModifyCandidate,
            5 => Self::CreateAsset,
            6 => Self::IssueAsset,
            7 => Self::ReplenishAsset,
            8 => Self::ModifyAsset,
            9 => Self::TransferAsset,
            10 => Self::ModifySigs,
            11 => Self::Box,
            other => Self::Other(other),
        }
    }
}

impl From<TransactionType> for u16 {
    fn from(t: TransactionType) -> Self {
        t.code()
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "Other({})", code),
            named => write!(f, "{:?}", named),
        }
    }
}

// ---------------------------------------------------------------------------
// SigningState
// ---------------------------------------------------------------------------

/// How far through signing a transaction is. Transitions only move forward,
/// and only by adding signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SigningState {
    /// No signer signatures yet.
    Unsigned,
    /// At least one signer signature, no gas-payer signature.
    Signed,
    /// At least one gas-payer signature on top.
    Countersigned,
}

impl fmt::Display for SigningState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsigned => write!(f, "Unsigned"),
            Self::Signed => write!(f, "Signed"),
            Self::Countersigned => write!(f, "Countersigned"),
        }
    }
}

// ---------------------------------------------------------------------------
// Packed V
// ---------------------------------------------------------------------------
//
//   31        24 23      17  16  15                0
//  +------------+----------+----+-------------------+
//  | type (8)   | ver (7)  | rb |   chain id (16)   |
//  +------------+----------+----+-------------------+

const RECOVERY_BIT: u32 = 1 << 16;

/// Packs type, version and chain id into a V value with the recovery bit
/// clear. Only the low 8 bits of the type and low 7 bits of the version fit.
pub fn combine_v(tx_type: u16, version: u8, chain_id: u16) -> u32 {
    (u32::from(tx_type & 0xff) << 24) | (u32::from(version & 0x7f) << 17) | u32::from(chain_id)
}

/// Sets or clears the recovery bit of a packed V value. Only the low bit of
/// `recovery` is used.
pub fn set_recovery_bit(v: u32, recovery: u8) -> u32 {
    (v & !RECOVERY_BIT) | (u32::from(recovery & 1) << 16)
}

/// Unpacks `(type, version, recovery bit, chain id)`.
pub fn split_v(v: u32) -> (u16, u8, u8, u16) {
    let tx_type = (v >> 24) as u16;
    let version = ((v >> 17) & 0x7f) as u8;
    let recovery = ((v >> 16) & 1) as u8;
    let chain_id = (v & 0xffff) as u16;
    (tx_type, version, recovery, chain_id)
}

// ---------------------------------------------------------------------------
// TransactionError
// ---------------------------------------------------------------------------

/// Errors that can occur while building, signing, verifying or decoding a
/// transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The version does not fit the 7 bits reserved for it.
    #[error("invalid transaction version {0}, must be < 128")]
    VersionOutOfRange(u8),

    /// The first signer is not the declared sender.
    #[error("sender mismatch: transaction is from {expected}, first signer is {recovered}")]
    SenderMismatch {
        /// The `from` field.
        expected: Address,
        /// The address recovered from the first signature.
        recovered: Address,
    },

    /// Signing or recovery failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// An address field could not be parsed.
    #[error(transparent)]
    Address(#[from] AddressError),

    /// The wire bytes are not a valid transaction encoding.
    #[error("rlp: {0}")]
    Rlp(#[from] RlpError),

    /// The JSON form is malformed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// A JSON integer field is out of range for its type.
    #[error("field {field} out of range: {value}")]
    FieldOutOfRange {
        /// JSON key of the field.
        field: &'static str,
        /// The rejected value.
        value: u64,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_codes_roundtrip() {
        for code in 0u16..=20 {
            assert_eq!(TransactionType::from(code).code(), code);
        }
        assert_eq!(TransactionType::from(11), TransactionType::Box);
        assert_eq!(TransactionType::from(300), TransactionType::Other(300));
    }

    #[test]
    fn type_display() {
        assert_eq!(TransactionType::Ordinary.to_string(), "Ordinary");
        assert_eq!(TransactionType::Other(42).to_string(), "Other(42)");
    }

    #[test]
    fn combine_v_layout() {
        let v = combine_v(11, 1, 100);
        assert_eq!(v, (11 << 24) | (1 << 17) | 100);
        assert_eq!(split_v(v), (11, 1, 0, 100));
    }

    #[test]
    fn recovery_bit_is_bit_sixteen() {
        let v = combine_v(0, 1, 0xffff);
        let with = set_recovery_bit(v, 1);
        assert_eq!(with, v | 0x1_0000);
        assert_eq!(split_v(with).2, 1);
        assert_eq!(set_recovery_bit(with, 0), v);
        // Only the low bit counts.
        assert_eq!(set_recovery_bit(v, 3), with);
    }

    #[test]
    fn oversized_fields_are_masked() {
        let v = combine_v(0x1ff, 0xff, 7);
        assert_eq!(split_v(v), (0xff, 0x7f, 0, 7));
    }

    #[test]
    fn signing_state_is_ordered() {
        assert!(SigningState::Unsigned < SigningState::Signed);
        assert!(SigningState::Signed < SigningState::Countersigned);
    }
}
