//! The dispenser: one faucet key, one store, one ledger.
//!
//! A grant goes: parse the recipient, look up its last grant, apply the
//! throttle, build and sign an ordinary transfer, submit it, then record
//! the transfer's expiration. The record is only written after the ledger
//! has accepted the transaction, so a failed submission does not lock the
//! recipient out for a day.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use super::policy::{retry_after, FaucetConfig};
use crate::crypto::{Hash, LemoKeypair, Signer};
use crate::identity::{Address, AddressError};
use crate::network::{LedgerClient, RpcClientError};
use crate::storage::{StoreError, TimestampStore};
use crate::transaction::{Transaction, TransactionBuilder, TransactionError};

/// Errors from a faucet operation.
#[derive(Debug, thiserror::Error)]
pub enum FaucetError {
    #[error("invalid recipient address: {0}")]
    Address(#[from] AddressError),

    #[error("timestamp store error: {0}")]
    Store(#[from] StoreError),

    #[error("ledger RPC error: {0}")]
    Rpc(#[from] RpcClientError),

    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),
}

/// What happened to a drip request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DripOutcome {
    /// A transfer was signed and accepted by the ledger.
    Sent {
        recipient: Address,
        /// Identity hash of the signed transaction.
        tx_hash: Hash,
        /// Whatever the ledger returned for the submission.
        ledger_handle: String,
        /// True when the address had never been served before.
        first_request: bool,
    },
    /// The address was served too recently.
    Throttled {
        recipient: Address,
        retry_after: Duration,
    },
}

/// A faucet bound to its signing key, timestamp store and ledger client.
pub struct Dispenser<S, L> {
    signer: Signer,
    keypair: LemoKeypair,
    store: S,
    client: L,
    config: FaucetConfig,
}

impl<S: TimestampStore, L: LedgerClient> Dispenser<S, L> {
    pub fn new(keypair: LemoKeypair, store: S, client: L, config: FaucetConfig) -> Self {
        Self {
            signer: Signer::new(),
            keypair,
            store,
            client,
            config,
        }
    }

    /// The address grants are sent from.
    pub fn faucet_address(&self) -> Address {
        self.keypair.address()
    }

    pub fn config(&self) -> &FaucetConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Builds and signs the transfer a grant to `recipient` at `now` would send.
    pub fn prepare_transfer(&self, recipient: Address, now: u64) -> Result<Transaction, FaucetError> {
        let tx = TransactionBuilder::new(self.keypair.address())
            .to(recipient)
            .to_name(self.config.to_name.as_str())
            .chain_id(self.config.chain_id)
            .gas_price(self.config.gas_price)
            .gas_limit(self.config.gas_limit)
            .amount(self.config.drip_amount.clone())
            .expiration(self.config.expiration_at(now))
            .message(self.config.message.as_str())
            .build()?
            .sign(&self.signer, &self.keypair)?;
        Ok(tx)
    }

    /// Serves a grant request for `recipient_text` (branded or hex) at unix
    /// time `now`.
    pub async fn drip(&self, recipient_text: &str, now: u64) -> Result<DripOutcome, FaucetError> {
        let recipient = Address::parse(recipient_text)?;
        let key = recipient.to_branded();

        let last = self.store.get(&key)?;
        if let Some(wait) = retry_after(&self.config, last, now) {
            info!(recipient = %key, retry_after_secs = wait.as_secs(), "drip throttled");
            return Ok(DripOutcome::Throttled {
                recipient,
                retry_after: wait,
            });
        }

        let tx = self.prepare_transfer(recipient, now)?;
        let ledger_handle = match self.client.send_transaction(&tx).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!(recipient = %key, error = %e, "ledger rejected faucet transfer");
                return Err(e.into());
            }
        };
        self.store.put(&key, tx.expiration())?;

        let tx_hash = tx.identity_hash();
        info!(
            recipient = %key,
            tx_hash = %tx_hash,
            ledger_handle = %ledger_handle,
            first_request = last == 0,
            "drip sent"
        );
        Ok(DripOutcome::Sent {
            recipient,
            tx_hash,
            ledger_handle,
            first_request: last == 0,
        })
    }

    /// [`drip`](Self::drip) at the current wall-clock time.
    pub async fn drip_now(&self, recipient_text: &str) -> Result<DripOutcome, FaucetError> {
        let now = Utc::now().timestamp().max(0) as u64;
        self.drip(recipient_text, now).await
    }

    /// Ledger balance of `recipient_text`.
    pub async fn balance(&self, recipient_text: &str) -> Result<String, FaucetError> {
        let address = Address::parse(recipient_text)?;
        Ok(self.client.get_balance(&address).await?)
    }
}
