//! Wire and JSON encodings of a [`Transaction`].
//!
//! The wire form is an RLP list of all sixteen fields in declaration order,
//! `gasUsed` included:
//!
//! ```text
//! [type, version, chainId, from, gasPayer, to, toName, gasPrice, gasLimit,
//!  gasUsed, amount, data, expiration, message, sigs, gasPayerSigs]
//! ```
//!
//! The JSON form is what the ledger's RPC speaks. It adds a read-only
//! `hash` (the identity hash) that is ignored when decoding, since a
//! client-supplied hash would be trusting the wrong party.

use num_bigint::BigUint;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use super::builder::{check_version, encode_signatures, Transaction};
use super::types::{TransactionError, TransactionType};
use crate::crypto::{Hash, Signature};
use crate::encoding::hexfmt;
use crate::encoding::rlp::{self, RlpItem};
use crate::identity::Address;

const WIRE_FIELDS: usize = 16;

// ---------------------------------------------------------------------------
// RLP
// ---------------------------------------------------------------------------

impl Transaction {
    /// Canonical wire bytes.
    pub fn to_rlp(&self) -> Vec<u8> {
        rlp::encode_list(&[
            rlp::encode_u64(u64::from(self.tx_type.code())),
            rlp::encode_u64(u64::from(self.version)),
            rlp::encode_u64(u64::from(self.chain_id)),
            rlp::encode_bytes(self.from.as_bytes()),
            rlp::encode_address(self.gas_payer.as_ref()),
            rlp::encode_address(self.to.as_ref()),
            rlp::encode_str(&self.to_name),
            rlp::encode_biguint(&self.gas_price),
            rlp::encode_u64(self.gas_limit),
            rlp::encode_u64(self.gas_used),
            rlp::encode_biguint(&self.amount),
            rlp::encode_bytes(&self.data),
            rlp::encode_u64(self.expiration),
            rlp::encode_str(&self.message),
            encode_signatures(&self.sigs),
            encode_signatures(&self.gas_payer_sigs),
        ])
    }

    /// Decodes wire bytes. Non-canonical encodings and versions of 128 or
    /// more are rejected.
    pub fn from_rlp(bytes: &[u8]) -> Result<Self, TransactionError> {
        let root = rlp::decode(bytes)?;
        let f = root.as_list_of(WIRE_FIELDS)?;

        let version = f[1].as_u8()?;
        check_version(version)?;

        let from = f[3]
            .as_address()?
            .ok_or(rlp::RlpError::UnexpectedKind {
                expected: "20-byte address",
                found: "empty string",
            })?;

        Ok(Self {
            tx_type: TransactionType::from(f[0].as_u16()?),
            version,
            chain_id: f[2].as_u16()?,
            from,
            gas_payer: f[4].as_address()?,
            to: f[5].as_address()?,
            to_name: f[6].as_string()?,
            gas_price: f[7].as_biguint()?,
            gas_limit: f[8].as_u64()?,
            gas_used: f[9].as_u64()?,
            amount: f[10].as_biguint()?,
            data: f[11].as_bytes()?.to_vec(),
            expiration: f[12].as_u64()?,
            message: f[13].as_string()?,
            sigs: decode_signatures(&f[14])?,
            gas_payer_sigs: decode_signatures(&f[15])?,
            hash: OnceCell::new(),
        })
    }
}

fn decode_signatures(item: &RlpItem<'_>) -> Result<Vec<Signature>, TransactionError> {
    item.as_list()?
        .iter()
        .map(|s| -> Result<Signature, TransactionError> {
            Ok(Signature::from_bytes(s.as_bytes()?)?)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// The ledger's JSON shape of a transaction.
#[derive(Serialize, Deserialize)]
struct TxJson {
    #[serde(rename = "type", with = "hexfmt::quantity")]
    tx_type: u64,
    #[serde(with = "hexfmt::quantity")]
    version: u64,
    #[serde(rename = "chainID", with = "hexfmt::quantity")]
    chain_id: u64,
    from: Address,
    #[serde(rename = "gasPayer", default)]
    gas_payer: Option<Address>,
    #[serde(default)]
    to: Option<Address>,
    #[serde(rename = "toName", default)]
    to_name: String,
    #[serde(rename = "gasPrice", with = "hexfmt::decimal")]
    gas_price: BigUint,
    #[serde(rename = "gasLimit", with = "hexfmt::quantity")]
    gas_limit: u64,
    #[serde(rename = "gasUsed", with = "hexfmt::quantity", default)]
    gas_used: u64,
    #[serde(with = "hexfmt::decimal")]
    amount: BigUint,
    #[serde(with = "hexfmt::bytes", default)]
    data: Vec<u8>,
    #[serde(rename = "expirationTime", with = "hexfmt::quantity")]
    expiration: u64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    sigs: Vec<Signature>,
    #[serde(rename = "gasPayerSigs", default)]
    gas_payer_sigs: Vec<Signature>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    hash: Option<Hash>,
}

fn narrow<T: TryFrom<u64>>(field: &'static str, value: u64) -> Result<T, TransactionError> {
    T::try_from(value).map_err(|_| TransactionError::FieldOutOfRange { field, value })
}

impl TryFrom<TxJson> for Transaction {
    type Error = TransactionError;

    fn try_from(j: TxJson) -> Result<Self, Self::Error> {
        let version: u8 = narrow("version", j.version)?;
        check_version(version)?;
        Ok(Self {
            tx_type: TransactionType::from(narrow::<u16>("type", j.tx_type)?),
            version,
            chain_id: narrow("chainID", j.chain_id)?,
            from: j.from,
            gas_payer: j.gas_payer,
            to: j.to,
            to_name: j.to_name,
            gas_price: j.gas_price,
            gas_limit: j.gas_limit,
            gas_used: j.gas_used,
            amount: j.amount,
            data: j.data,
            expiration: j.expiration,
            message: j.message,
            sigs: j.sigs,
            gas_payer_sigs: j.gas_payer_sigs,
            hash: OnceCell::new(),
        })
    }
}

impl From<&Transaction> for TxJson {
    fn from(tx: &Transaction) -> Self {
        Self {
            tx_type: u64::from(tx.tx_type.code()),
            version: u64::from(tx.version),
            chain_id: u64::from(tx.chain_id),
            from: tx.from,
            gas_payer: tx.gas_payer,
            to: tx.to,
            to_name: tx.to_name.clone(),
            gas_price: tx.gas_price.clone(),
            gas_limit: tx.gas_limit,
            gas_used: tx.gas_used,
            amount: tx.amount.clone(),
            data: tx.data.clone(),
            expiration: tx.expiration,
            message: tx.message.clone(),
            sigs: tx.sigs.clone(),
            gas_payer_sigs: tx.gas_payer_sigs.clone(),
            hash: Some(tx.identity_hash()),
        }
    }
}

impl Serialize for Transaction {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TxJson::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Transaction {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let j = TxJson::deserialize(deserializer)?;
        Transaction::try_from(j).map_err(serde::de::Error::custom)
    }
}

impl Transaction {
    /// JSON text as the ledger's RPC expects it.
    pub fn to_json(&self) -> Result<String, TransactionError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses the ledger's JSON form. Any `hash` field is ignored.
    pub fn from_json(text: &str) -> Result<Self, TransactionError> {
        Ok(serde_json::from_str(text)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
