//! # Protocol Configuration & Constants
//!
//! Every magic number the Lemo client side depends on lives here. Most of
//! these are dictated by the ledger we talk to, not chosen by us: change
//! the address brand or version byte and every address you print becomes
//! somebody else's (or nobody's) account.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Address Format
// ---------------------------------------------------------------------------

/// Brand tag prepended to every checksummed address. Matched
/// case-insensitively when parsing.
pub const ADDRESS_BRAND: &str = "Lemo";

/// Raw address length in bytes.
pub const ADDRESS_LENGTH: usize = 20;

/// Version byte placed in front of the 19 hash bytes when an address is
/// derived from a public key.
pub const ADDRESS_VERSION: u8 = 0x01;

/// Number of Keccak-256 output bytes kept when deriving an address.
pub const ADDRESS_HASH_BYTES: usize = ADDRESS_LENGTH - 1;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Digest length of the hash engine (Keccak-256).
pub const HASH_LENGTH: usize = 32;

/// Recoverable ECDSA signature length: `R (32) || S (32) || V (1)`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Uncompressed secp256k1 public key length: `0x04 || X (32) || Y (32)`.
pub const UNCOMPRESSED_PUBKEY_LENGTH: usize = 65;

/// Marker byte of an uncompressed SEC1 point.
pub const UNCOMPRESSED_POINT_MARKER: u8 = 0x04;

/// secp256k1 secret key length.
pub const SECRET_KEY_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Transaction format version stamped on everything we build.
pub const TX_VERSION: u8 = 1;

/// Exclusive upper bound for the version field. Only 7 bits of the packed
/// V value are available for it.
pub const MAX_TX_VERSION: u8 = 128;

/// Default time-to-live of a transaction, used when the caller does not
/// pick an expiration explicitly.
pub const DEFAULT_TX_TTL: Duration = Duration::from_secs(2 * 60 * 60);

// ---------------------------------------------------------------------------
// Faucet Defaults
// ---------------------------------------------------------------------------

/// Chain id of the Lemo test network served by the faucet.
pub const FAUCET_CHAIN_ID: u16 = 100;

/// Gas price attached to faucet transfers (1 Gmo).
pub const FAUCET_GAS_PRICE: u64 = 1_000_000_000;

/// Gas limit attached to faucet transfers. A plain transfer needs far less.
pub const FAUCET_GAS_LIMIT: u64 = 50_000;

/// Amount sent per successful request: 10 LEMO in base units (10^18 per LEMO).
pub const FAUCET_DRIP_AMOUNT: u64 = 10_000_000_000_000_000_000;

/// Minimum spacing between two grants to the same address.
pub const FAUCET_DRIP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// How far in the future faucet transactions expire. The throttle also
/// measures against this horizon.
pub const FAUCET_EXPIRATION_WINDOW: Duration = Duration::from_secs(30 * 60);

/// Recipient name stamped on faucet transfers.
pub const FAUCET_RECIPIENT_NAME: &str = "wx";

/// Message stamped on faucet transfers.
pub const FAUCET_MESSAGE: &str = "water faucet";

// ---------------------------------------------------------------------------
// JSON-RPC
// ---------------------------------------------------------------------------

/// JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

/// Ledger method that accepts a signed transaction.
pub const RPC_SEND_TX: &str = "tx_sendTx";

/// Ledger method that returns an account balance as a decimal string.
pub const RPC_GET_BALANCE: &str = "account_getBalance";

/// Default ledger node endpoint for local development.
pub const DEFAULT_RPC_URL: &str = "http://127.0.0.1:8001";

/// Upper bound on how long we wait for a ledger node to answer.
pub const RPC_TIMEOUT: Duration = Duration::from_secs(10);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brand_is_four_ascii_letters() {
        assert_eq!(ADDRESS_BRAND.len(), 4);
        assert!(ADDRESS_BRAND.chars().all(|c| c.is_ascii_alphabetic()));
    }

    #[test]
    fn address_layout_adds_up() {
        assert_eq!(ADDRESS_HASH_BYTES + 1, ADDRESS_LENGTH);
        assert_eq!(SIGNATURE_LENGTH, 2 * HASH_LENGTH + 1);
        assert_eq!(UNCOMPRESSED_PUBKEY_LENGTH, 1 + 2 * SECRET_KEY_LENGTH);
    }

    #[test]
    fn tx_version_fits_seven_bits() {
        assert!(TX_VERSION < MAX_TX_VERSION);
        assert_eq!(MAX_TX_VERSION as u32, 1 << 7);
    }

    #[test]
    fn faucet_window_is_shorter_than_interval() {
        // Otherwise a fresh grant would immediately unlock the next one.
        assert!(FAUCET_EXPIRATION_WINDOW < FAUCET_DRIP_INTERVAL);
    }
}
