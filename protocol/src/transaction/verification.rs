//! Transaction verification: who signed, and is it who it claims to be.
//!
//! Lemo signatures carry no public key, so "verifying" a transaction means
//! recovering the address behind each signature against the signing hash
//! and comparing addresses. Recovery fails closed: one bad signature fails
//! the whole list.

use tracing::debug;

use super::builder::Transaction;
use super::types::{SigningState, TransactionError};
use crate::crypto::{Signature, SignatureError, Signer};
use crate::identity::Address;

fn recover_all(
    signer: &Signer,
    digest: &[u8],
    sigs: &[Signature],
) -> Result<Vec<Address>, TransactionError> {
    if sigs.is_empty() {
        return Err(SignatureError::DataMissing.into());
    }
    sigs.iter()
        .map(|sig| -> Result<Address, TransactionError> {
            let pubkey = signer.recover(digest, sig)?;
            Ok(Address::from_public_key(&pubkey))
        })
        .collect()
}

impl Transaction {
    /// Addresses behind the signer signatures, in signature order.
    ///
    /// An unsigned transaction is an error, not an empty list.
    pub fn signers(&self, signer: &Signer) -> Result<Vec<Address>, TransactionError> {
        recover_all(signer, self.signing_hash().as_bytes(), &self.sigs)
    }

    /// Addresses behind the gas-payer signatures, in signature order.
    pub fn gas_payer_signers(&self, signer: &Signer) -> Result<Vec<Address>, TransactionError> {
        recover_all(signer, self.signing_hash().as_bytes(), &self.gas_payer_sigs)
    }

    /// Checks that the first signer is the declared sender and returns it.
    pub fn verify_sender(&self, signer: &Signer) -> Result<Address, TransactionError> {
        let signers = self.signers(signer)?;
        let first = signers[0];
        if first != self.from {
            debug!(from = %self.from, recovered = %first, "sender mismatch");
            return Err(TransactionError::SenderMismatch {
                expected: self.from,
                recovered: first,
            });
        }
        Ok(first)
    }

    /// Where the transaction is in its signing lifecycle.
    pub fn state(&self) -> SigningState {
        if !self.gas_payer_sigs.is_empty() {
            SigningState::Countersigned
        } else if !self.sigs.is_empty() {
            SigningState::Signed
        } else {
            SigningState::Unsigned
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::LemoKeypair;
    use crate::transaction::TransactionBuilder;

    fn signed_by(kp: &LemoKeypair, signer: &Signer) -> Transaction {
        TransactionBuilder::new(kp.address())
            .to(Address::from_bytes([2; 20]))
            .chain_id(100)
            .amount(1u64)
            .expiration(1_700_000_000)
            .build()
            .unwrap()
            .sign(signer, kp)
            .unwrap()
    }

    #[test]
    fn unsigned_has_no_signers() {
        let signer = Signer::new();
        let tx = TransactionBuilder::new(Address::ZERO).build().unwrap();
        assert_eq!(tx.state(), SigningState::Unsigned);
        assert!(matches!(
            tx.signers(&signer),
            Err(TransactionError::Signature(SignatureError::DataMissing))
        ));
        assert!(matches!(
            tx.gas_payer_signers(&signer),
            Err(TransactionError::Signature(SignatureError::DataMissing))
        ));
    }

    #[test]
    fn multi_signature_recovers_in_order() {
        let signer = Signer::new();
        let a = LemoKeypair::generate();
        let b = LemoKeypair::generate();
        let c = LemoKeypair::generate();
        let tx = signed_by(&a, &signer)
            .sign(&signer, &b)
            .unwrap()
            .sign(&signer, &c)
            .unwrap();
        assert_eq!(
            tx.signers(&signer).unwrap(),
            vec![a.address(), b.address(), c.address()]
        );
        assert_eq!(tx.state(), SigningState::Signed);
    }

    #[test]
    fn gas_payer_recovered_separately() {
        let signer = Signer::new();
        let sender = LemoKeypair::generate();
        let payer = LemoKeypair::generate();
        let tx = signed_by(&sender, &signer)
            .sign_as_gas_payer(&signer, &payer)
            .unwrap();
        assert_eq!(tx.signers(&signer).unwrap(), vec![sender.address()]);
        assert_eq!(tx.gas_payer_signers(&signer).unwrap(), vec![payer.address()]);
    }

    #[test]
    fn verify_sender_accepts_owner() {
        let signer = Signer::new();
        let kp = LemoKeypair::generate();
        let tx = signed_by(&kp, &signer);
        assert_eq!(tx.verify_sender(&signer).unwrap(), kp.address());
    }

    #[test]
    fn verify_sender_rejects_stranger() {
        let signer = Signer::new();
        let owner = LemoKeypair::generate();
        let stranger = LemoKeypair::generate();
        let tx = TransactionBuilder::new(owner.address())
            .build()
            .unwrap()
            .sign(&signer, &stranger)
            .unwrap();
        match tx.verify_sender(&signer) {
            Err(TransactionError::SenderMismatch { expected, recovered }) => {
                assert_eq!(expected, owner.address());
                assert_eq!(recovered, stranger.address());
            }
            other => panic!("expected SenderMismatch, got {:?}", other),
        }
    }

    #[test]
    fn tampered_field_changes_recovered_signer() {
        let signer = Signer::new();
        let kp = LemoKeypair::generate();
        let tx = signed_by(&kp, &signer);
        let mut tampered = tx.clone();
        tampered.amount = 1_000_000u64.into();
        match tampered.signers(&signer) {
            Ok(addrs) => assert_ne!(addrs[0], kp.address()),
            Err(_) => {}
        }
        assert!(tampered.verify_sender(&signer).is_err());
    }
}
