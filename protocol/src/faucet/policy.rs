//! Faucet parameters and the rate-limit rule.
//!
//! The store holds the *expiration* of the last transfer sent to an
//! address, not the time it was requested. A request at `now` is allowed
//! when
//!
//! ```text
//! last == 0  ||  last + interval < now + window
//! ```
//!
//! i.e. when a transfer sent now (expiring at `now + window`) would expire
//! strictly more than one interval after the previous one.

use std::time::Duration;

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::config::{
    FAUCET_CHAIN_ID, FAUCET_DRIP_AMOUNT, FAUCET_DRIP_INTERVAL, FAUCET_EXPIRATION_WINDOW,
    FAUCET_GAS_LIMIT, FAUCET_GAS_PRICE, FAUCET_MESSAGE, FAUCET_RECIPIENT_NAME,
};
use crate::encoding::hexfmt;

/// Runtime parameters of a faucet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FaucetConfig {
    pub chain_id: u16,
    pub gas_price: u64,
    pub gas_limit: u64,
    /// Base units per grant, as a decimal string in JSON.
    #[serde(with = "hexfmt::decimal")]
    pub drip_amount: BigUint,
    /// Minimum spacing between grants to one address, in seconds.
    pub drip_interval_secs: u64,
    /// Lifetime of a faucet transaction, in seconds.
    pub expiration_window_secs: u64,
    pub to_name: String,
    pub message: String,
}

impl Default for FaucetConfig {
    fn default() -> Self {
        Self {
            chain_id: FAUCET_CHAIN_ID,
            gas_price: FAUCET_GAS_PRICE,
            gas_limit: FAUCET_GAS_LIMIT,
            drip_amount: BigUint::from(FAUCET_DRIP_AMOUNT),
            drip_interval_secs: FAUCET_DRIP_INTERVAL.as_secs(),
            expiration_window_secs: FAUCET_EXPIRATION_WINDOW.as_secs(),
            to_name: FAUCET_RECIPIENT_NAME.to_string(),
            message: FAUCET_MESSAGE.to_string(),
        }
    }
}

impl FaucetConfig {
    /// Expiration stamped on a transfer sent at `now`.
    pub fn expiration_at(&self, now: u64) -> u64 {
        now.saturating_add(self.expiration_window_secs)
    }
}

/// How long the caller has to wait, or `None` if a grant is allowed now.
///
/// `last` is the recorded expiration of the previous grant (0 = never).
pub fn retry_after(config: &FaucetConfig, last: u64, now: u64) -> Option<Duration> {
    if last == 0 {
        return None;
    }
    let unlocks_at = last.saturating_add(config.drip_interval_secs);
    let horizon = config.expiration_at(now);
    if unlocks_at < horizon {
        None
    } else {
        Some(Duration::from_secs(unlocks_at - horizon))
    }
}
