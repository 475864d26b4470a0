//! Transaction signing with secp256k1 keypairs.
//!
//! Signing never mutates: it returns a new transaction with one more
//! signature appended and an empty hash cache. The original stays valid,
//! which is what lets several parties countersign the same base
//! transaction independently.
//!
//! Both signer and gas-payer signatures are taken over the signing hash,
//! which excludes the signature lists, so signing order does not change
//! what the next party signs.

use super::builder::Transaction;
use super::types::TransactionError;
use crate::crypto::{LemoKeypair, Signer};

impl Transaction {
    /// Signs as (one of) the sender(s) and returns the signed copy.
    ///
    /// # Example
    ///
    /// ```
    /// use lemo_protocol::crypto::{LemoKeypair, Signer};
    /// use lemo_protocol::transaction::TransactionBuilder;
    ///
    /// let signer = Signer::new();
    /// let kp = LemoKeypair::generate();
    /// let tx = TransactionBuilder::new(kp.address()).chain_id(100).build().unwrap();
    ///
    /// let signed = tx.sign(&signer, &kp).unwrap();
    /// assert_eq!(signed.signers(&signer).unwrap(), vec![kp.address()]);
    /// assert!(tx.sigs().is_empty());
    /// ```
    pub fn sign(&self, signer: &Signer, keypair: &LemoKeypair) -> Result<Transaction, TransactionError> {
        let sig = signer.sign(self.signing_hash().as_bytes(), keypair)?;
        let mut signed = self.clone();
        signed.sigs.push(sig);
        Ok(signed)
    }

    /// Signs as the gas payer and returns the countersigned copy.
    pub fn sign_as_gas_payer(
        &self,
        signer: &Signer,
        keypair: &LemoKeypair,
    ) -> Result<Transaction, TransactionError> {
        let sig = signer.sign(self.signing_hash().as_bytes(), keypair)?;
        let mut signed = self.clone();
        signed.gas_payer_sigs.push(sig);
        Ok(signed)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::crypto::{LemoKeypair, Signer};
    use crate::transaction::{SigningState, Transaction, TransactionBuilder};

    fn unsigned(kp: &LemoKeypair) -> Transaction {
        TransactionBuilder::new(kp.address())
            .to(LemoKeypair::generate().address())
            .chain_id(100)
            .amount(500u64)
            .expiration(1_700_000_000)
            .build()
            .unwrap()
    }

    #[test]
    fn sign_appends_to_a_copy() {
        let signer = Signer::new();
        let kp = LemoKeypair::generate();
        let tx = unsigned(&kp);

        let signed = tx.sign(&signer, &kp).unwrap();
        assert!(tx.sigs().is_empty());
        assert_eq!(signed.sigs().len(), 1);
        assert!(signed.gas_payer_sigs().is_empty());
    }

    #[test]
    fn signing_hash_stable_identity_hash_changes() {
        let signer = Signer::new();
        let kp = LemoKeypair::generate();
        let tx = unsigned(&kp);
        let identity_before = tx.identity_hash();

        let signed = tx.sign(&signer, &kp).unwrap();
        assert_eq!(signed.signing_hash(), tx.signing_hash());
        assert_ne!(signed.identity_hash(), identity_before);
        // Original's cached value is untouched.
        assert_eq!(tx.identity_hash(), identity_before);
    }

    #[test]
    fn gas_payer_signature_goes_to_its_own_list() {
        let signer = Signer::new();
        let kp = LemoKeypair::generate();
        let payer = LemoKeypair::generate();
        let signed = unsigned(&kp).sign(&signer, &kp).unwrap();
        let counter = signed.sign_as_gas_payer(&signer, &payer).unwrap();

        assert_eq!(counter.sigs(), signed.sigs());
        assert_eq!(counter.gas_payer_sigs().len(), 1);
        assert_ne!(counter.identity_hash(), signed.identity_hash());
        assert_eq!(counter.state(), SigningState::Countersigned);
    }

    #[test]
    fn signing_order_does_not_change_signatures() {
        let signer = Signer::new();
        let a = LemoKeypair::generate();
        let b = LemoKeypair::generate();
        let tx = unsigned(&a);

        let ab = tx.sign(&signer, &a).unwrap().sign(&signer, &b).unwrap();
        let ba = tx.sign(&signer, &b).unwrap().sign(&signer, &a).unwrap();
        assert_eq!(ab.sigs()[0], ba.sigs()[1]);
        assert_eq!(ab.sigs()[1], ba.sigs()[0]);
        // Identity hashes differ because list order is hashed.
        assert_ne!(ab.identity_hash(), ba.identity_hash());
    }

    #[test]
    fn packed_v_tracks_last_signature() {
        let signer = Signer::new();
        let kp = LemoKeypair::generate();
        let signed = unsigned(&kp).sign(&signer, &kp).unwrap();
        let bit = signed.sigs()[0].recovery_bit() as u32;
        assert_eq!(signed.packed_v(), (1 << 17) | (bit << 16) | 100);
    }
}
