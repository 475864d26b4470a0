//! # CLI Interface
//!
//! Command-line structure for `lemo-faucet`, via `clap` derive. Every
//! secret and endpoint can come from a `LEMO_*` environment variable so it
//! never has to appear in shell history.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use lemo_protocol::config::{
    DEFAULT_RPC_URL, FAUCET_CHAIN_ID, FAUCET_GAS_LIMIT, FAUCET_GAS_PRICE,
};

use crate::logging::LogFormat;

/// Lemo test-network faucet.
///
/// Derives addresses, builds and signs transactions, recovers signers, and
/// hands out test LEMO at most once a day per address.
#[derive(Parser, Debug)]
#[command(
    name = "lemo-faucet",
    about = "Lemo test-network faucet and signing tool",
    version,
    propagate_version = true
)]
pub struct LemoFaucetCli {
    /// Log output format.
    #[arg(long, global = true, env = "LEMO_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is unset.
    #[arg(long, global = true, env = "LEMO_LOG", default_value = "lemo_faucet=info,lemo_protocol=info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a fresh keypair and print its key and addresses.
    Keygen,
    /// Print both text forms of an address, or of a private key's address.
    Address(AddressArgs),
    /// Build and sign a transaction; print its JSON and RLP encodings.
    Sign(SignArgs),
    /// Read a transaction as JSON and print who signed it.
    Recover(RecoverArgs),
    /// Send test LEMO to an address, subject to the daily limit.
    Drip(DripArgs),
    /// Ask the ledger for an address's balance.
    Balance(BalanceArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Args, Debug)]
pub struct AddressArgs {
    /// A branded (`Lemo…`) or hex address, or a hex private key with `--key`.
    pub input: String,

    /// Treat the input as a private key.
    #[arg(long)]
    pub key: bool,
}

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Hex private key of the signer.
    #[arg(long, env = "LEMO_PRIVATE_KEY", hide_env_values = true)]
    pub key: String,

    /// Sender address. Defaults to the signer's own address; set it when
    /// adding a signature to a multi-signature account's transaction.
    #[arg(long)]
    pub from: Option<String>,

    /// Recipient address.
    #[arg(long)]
    pub to: Option<String>,

    /// Account that pays for gas, if not the sender.
    #[arg(long)]
    pub gas_payer: Option<String>,

    /// Amount in base units (decimal).
    #[arg(long, default_value = "0")]
    pub amount: String,

    /// Numeric transaction type (0 = ordinary transfer).
    #[arg(long, default_value_t = 0)]
    pub tx_type: u16,

    #[arg(long, env = "LEMO_CHAIN_ID", default_value_t = FAUCET_CHAIN_ID)]
    pub chain_id: u16,

    #[arg(long, default_value_t = FAUCET_GAS_PRICE)]
    pub gas_price: u64,

    #[arg(long, default_value_t = FAUCET_GAS_LIMIT)]
    pub gas_limit: u64,

    /// Payload as hex.
    #[arg(long, default_value = "")]
    pub data: String,

    /// Expiration as unix seconds. Defaults to two hours from now.
    #[arg(long)]
    pub expiration: Option<u64>,

    #[arg(long, default_value = "")]
    pub to_name: String,

    #[arg(long, default_value = "")]
    pub message: String,
}

#[derive(Args, Debug)]
pub struct RecoverArgs {
    /// File holding the transaction JSON. Reads stdin when omitted.
    pub file: Option<PathBuf>,
}

/// Where the ledger node is.
#[derive(Args, Debug)]
pub struct NodeArgs {
    /// JSON-RPC endpoint of a ledger node.
    #[arg(long, env = "LEMO_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,
}

#[derive(Args, Debug)]
pub struct DripArgs {
    /// Recipient, branded or hex.
    pub address: String,

    /// Hex private key of the faucet account.
    #[arg(long, env = "LEMO_FAUCET_KEY", hide_env_values = true)]
    pub key: String,

    /// Directory of the throttle database.
    #[arg(long, env = "LEMO_DB_PATH", default_value = "lemo-faucet-db")]
    pub db_path: PathBuf,

    /// Faucet parameters as a JSON file. Built-in defaults when omitted.
    #[arg(long, env = "LEMO_FAUCET_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Account, branded or hex.
    pub address: String,

    #[command(flatten)]
    pub node: NodeArgs,
}
