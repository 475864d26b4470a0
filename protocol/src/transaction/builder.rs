//! Transaction construction via the builder pattern.
//!
//! The [`TransactionBuilder`] enforces a disciplined construction flow:
//! set the fields, call `.build()`, and get back an unsigned
//! [`Transaction`]. After that only the signature lists can grow, and
//! only by producing a new value (see [`super::signing`]).
//!
//! Two digests are defined over a transaction:
//!
//! - the **signing hash** covers every semantic field except the
//!   signature lists. It is what signers sign and what recovery runs
//!   against, so it stays the same as signatures are added.
//! - the **identity hash** covers the same fields plus both signature
//!   lists. It names the transaction on the ledger and changes with every
//!   new signature.
//!
//! `gasUsed` is filled in by the ledger and is in neither.

use chrono::Utc;
use num_bigint::BigUint;
use once_cell::sync::OnceCell;

use super::batch;
use super::types::{combine_v, set_recovery_bit, TransactionError, TransactionType};
use crate::config::{DEFAULT_TX_TTL, MAX_TX_VERSION, TX_VERSION};
use crate::crypto::{keccak256, Hash, Signature};
use crate::encoding::rlp;
use crate::identity::Address;

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A Lemo ledger transaction.
///
/// All fields are private. Construct with [`TransactionBuilder`], decode
/// with [`Transaction::from_rlp`] or serde, and read through the accessors.
///
/// The identity hash is computed on first use and cached. The cache is
/// write-once and safe to hit from many threads; a clone or a newly signed
/// copy starts with an empty one.
#[derive(Debug)]
pub struct Transaction {
    pub(super) tx_type: TransactionType,
    pub(super) version: u8,
    pub(super) chain_id: u16,
    pub(super) from: Address,
    pub(super) gas_payer: Option<Address>,
    pub(super) to: Option<Address>,
    pub(super) to_name: String,
    pub(super) gas_price: BigUint,
    pub(super) gas_limit: u64,
    pub(super) gas_used: u64,
    pub(super) amount: BigUint,
    pub(super) data: Vec<u8>,
    pub(super) expiration: u64,
    pub(super) message: String,
    pub(super) sigs: Vec<Signature>,
    pub(super) gas_payer_sigs: Vec<Signature>,
    pub(super) hash: OnceCell<Hash>,
}

impl Clone for Transaction {
    fn clone(&self) -> Self {
        Self {
            tx_type: self.tx_type,
            version: self.version,
            chain_id: self.chain_id,
            from: self.from,
            gas_payer: self.gas_payer,
            to: self.to,
            to_name: self.to_name.clone(),
            gas_price: self.gas_price.clone(),
            gas_limit: self.gas_limit,
            gas_used: self.gas_used,
            amount: self.amount.clone(),
            data: self.data.clone(),
            expiration: self.expiration,
            message: self.message.clone(),
            sigs: self.sigs.clone(),
            gas_payer_sigs: self.gas_payer_sigs.clone(),
            hash: OnceCell::new(),
        }
    }
}

impl PartialEq for Transaction {
    fn eq(&self, other: &Self) -> bool {
        self.tx_type == other.tx_type
            && self.version == other.version
            && self.chain_id == other.chain_id
            && self.from == other.from
            && self.gas_payer == other.gas_payer
            && self.to == other.to
            && self.to_name == other.to_name
            && self.gas_price == other.gas_price
            && self.gas_limit == other.gas_limit
            && self.gas_used == other.gas_used
            && self.amount == other.amount
            && self.data == other.data
            && self.expiration == other.expiration
            && self.message == other.message
            && self.sigs == other.sigs
            && self.gas_payer_sigs == other.gas_payer_sigs
    }
}

impl Eq for Transaction {}

impl Transaction {
    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn chain_id(&self) -> u16 {
        self.chain_id
    }

    /// The declared sender.
    pub fn from(&self) -> Address {
        self.from
    }

    /// Who pays for gas. Transactions built here always have one; decoded
    /// ones may not.
    pub fn gas_payer(&self) -> Option<Address> {
        self.gas_payer
    }

    /// The recipient. `None` means contract creation.
    pub fn to(&self) -> Option<Address> {
        self.to
    }

    pub fn to_name(&self) -> &str {
        &self.to_name
    }

    pub fn gas_price(&self) -> &BigUint {
        &self.gas_price
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    /// Gas consumed, as reported back by the ledger. Zero until then.
    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }

    pub fn amount(&self) -> &BigUint {
        &self.amount
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Unix seconds after which the ledger drops the transaction.
    pub fn expiration(&self) -> u64 {
        self.expiration
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Signer signatures, in signing order.
    pub fn sigs(&self) -> &[Signature] {
        &self.sigs
    }

    /// Gas-payer signatures, in signing order.
    pub fn gas_payer_sigs(&self) -> &[Signature] {
        &self.gas_payer_sigs
    }

    /// The packed V value: type, version and chain id, plus the recovery
    /// bit of the most recent signer signature (clear when unsigned).
    pub fn packed_v(&self) -> u32 {
        let v = combine_v(self.tx_type.code(), self.version, self.chain_id);
        match self.sigs.last() {
            Some(sig) => set_recovery_bit(v, sig.recovery_bit()),
            None => v,
        }
    }

    /// Encoded fields shared by both digests, in hashing order.
    fn hashed_fields(&self) -> Vec<Vec<u8>> {
        let content = batch::hashed_content(self.tx_type, &self.data);
        vec![
            rlp::encode_u64(u64::from(self.tx_type.code())),
            rlp::encode_u64(u64::from(self.version)),
            rlp::encode_u64(u64::from(self.chain_id)),
            rlp::encode_bytes(self.from.as_bytes()),
            rlp::encode_address(self.gas_payer.as_ref()),
            rlp::encode_address(self.to.as_ref()),
            rlp::encode_str(&self.to_name),
            rlp::encode_biguint(&self.gas_price),
            rlp::encode_u64(self.gas_limit),
            rlp::encode_biguint(&self.amount),
            rlp::encode_bytes(&content),
            rlp::encode_u64(self.expiration),
            rlp::encode_str(&self.message),
        ]
    }

    /// The digest signers sign. Independent of the signature lists.
    pub fn signing_hash(&self) -> Hash {
        keccak256(&rlp::encode_list(&self.hashed_fields()))
    }

    /// The ledger identity of this exact transaction, signatures included.
    /// Computed once per value.
    pub fn identity_hash(&self) -> Hash {
        *self.hash.get_or_init(|| {
            let mut fields = self.hashed_fields();
            fields.push(encode_signatures(&self.sigs));
            fields.push(encode_signatures(&self.gas_payer_sigs));
            keccak256(&rlp::encode_list(&fields))
        })
    }
}

pub(super) fn encode_signatures(sigs: &[Signature]) -> Vec<u8> {
    let items: Vec<Vec<u8>> = sigs.iter().map(|s| rlp::encode_bytes(s.as_bytes())).collect();
    rlp::encode_list(&items)
}

/// Rejects versions that do not fit the packed V layout.
pub(super) fn check_version(version: u8) -> Result<(), TransactionError> {
    if version >= MAX_TX_VERSION {
        return Err(TransactionError::VersionOutOfRange(version));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned [`Transaction`]s.
///
/// # Usage
///
/// ```
/// use lemo_protocol::crypto::LemoKeypair;
/// use lemo_protocol::transaction::{TransactionBuilder, TransactionType};
///
/// let alice = LemoKeypair::generate().address();
/// let bob = LemoKeypair::generate().address();
///
/// let tx = TransactionBuilder::new(alice)
///     .to(bob)
///     .chain_id(100)
///     .amount(10u64.pow(18))
///     .gas_limit(21_000)
///     .gas_price(1_000_000_000u64)
///     .expiration(1_700_000_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(tx.tx_type(), TransactionType::Ordinary);
/// assert_eq!(tx.gas_payer(), Some(alice));
/// ```
///
/// Defaults: type `Ordinary`, the current transaction version, chain id 0,
/// the sender as gas payer, no recipient, zero amounts, and an expiration
/// two hours from build time.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    tx_type: TransactionType,
    version: u8,
    chain_id: u16,
    from: Address,
    gas_payer: Option<Address>,
    to: Option<Address>,
    to_name: String,
    gas_price: BigUint,
    gas_limit: u64,
    amount: BigUint,
    data: Vec<u8>,
    expiration: Option<u64>,
    message: String,
}

impl TransactionBuilder {
    /// Starts a transaction sent by `from`.
    pub fn new(from: Address) -> Self {
        Self {
            tx_type: TransactionType::Ordinary,
            version: TX_VERSION,
            chain_id: 0,
            from,
            gas_payer: None,
            to: None,
            to_name: String::new(),
            gas_price: BigUint::default(),
            gas_limit: 0,
            amount: BigUint::default(),
            data: Vec::new(),
            expiration: None,
            message: String::new(),
        }
    }

    pub fn tx_type(mut self, tx_type: TransactionType) -> Self {
        self.tx_type = tx_type;
        self
    }

    /// Overrides the transaction version. Must be below 128.
    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn chain_id(mut self, chain_id: u16) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Lets someone other than the sender pay for gas.
    pub fn gas_payer(mut self, payer: Address) -> Self {
        self.gas_payer = Some(payer);
        self
    }

    pub fn to(mut self, recipient: Address) -> Self {
        self.to = Some(recipient);
        self
    }

    pub fn to_name(mut self, name: impl Into<String>) -> Self {
        self.to_name = name.into();
        self
    }

    pub fn gas_price(mut self, price: impl Into<BigUint>) -> Self {
        self.gas_price = price.into();
        self
    }

    pub fn gas_limit(mut self, limit: u64) -> Self {
        self.gas_limit = limit;
        self
    }

    pub fn amount(mut self, amount: impl Into<BigUint>) -> Self {
        self.amount = amount.into();
        self
    }

    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Sets the expiration explicitly (unix seconds).
    ///
    /// If not called, `build()` uses now plus two hours.
    pub fn expiration(mut self, unix_secs: u64) -> Self {
        self.expiration = Some(unix_secs);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Produces an unsigned [`Transaction`].
    pub fn build(self) -> Result<Transaction, TransactionError> {
        check_version(self.version)?;

        let expiration = self.expiration.unwrap_or_else(|| {
            Utc::now().timestamp().max(0) as u64 + DEFAULT_TX_TTL.as_secs()
        });

        Ok(Transaction {
            tx_type: self.tx_type,
            version: self.version,
            chain_id: self.chain_id,
            from: self.from,
            gas_payer: Some(self.gas_payer.unwrap_or(self.from)),
            to: self.to,
            to_name: self.to_name,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            gas_used: 0,
            amount: self.amount,
            data: self.data,
            expiration,
            message: self.message,
            sigs: Vec::new(),
            gas_payer_sigs: Vec::new(),
            hash: OnceCell::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
