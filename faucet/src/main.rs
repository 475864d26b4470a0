// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Lemo Faucet
//!
//! Entry point for the `lemo-faucet` binary. Parses CLI arguments,
//! initializes logging, and runs one command:
//!
//! - `keygen`  — generate a keypair
//! - `address` — convert between address forms
//! - `sign`    — build and sign a transaction
//! - `recover` — list the signers of a transaction
//! - `drip`    — send test LEMO, once a day per address
//! - `balance` — query a balance from a ledger node
//! - `version` — print build version information

mod cli;
mod logging;

use std::io::Read;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use num_bigint::BigUint;

use lemo_protocol::crypto::{LemoKeypair, Signer};
use lemo_protocol::faucet::{Dispenser, DripOutcome, FaucetConfig};
use lemo_protocol::identity::Address;
use lemo_protocol::network::{HttpLedgerClient, LedgerClient};
use lemo_protocol::storage::SledTimestampStore;
use lemo_protocol::transaction::{Transaction, TransactionBuilder, TransactionType};

use cli::{Commands, LemoFaucetCli};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = LemoFaucetCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Address(args) => address(args),
        Commands::Sign(args) => sign(args),
        Commands::Recover(args) => recover(args),
        Commands::Drip(args) => drip(args).await,
        Commands::Balance(args) => balance(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn keygen() -> Result<()> {
    let keypair = LemoKeypair::generate();
    let addr = keypair.address();
    println!("Private key : {}", keypair.secret_key_hex());
    println!("Public key  : 0x{}", hex::encode(keypair.public_key_uncompressed()));
    println!("Address     : {}", addr.to_branded());
    println!("Hex address : {}", addr.to_hex());
    Ok(())
}

fn address(args: cli::AddressArgs) -> Result<()> {
    let addr = if args.key {
        LemoKeypair::from_hex(&args.input)
            .context("invalid private key")?
            .address()
    } else {
        Address::parse(&args.input)
            .with_context(|| format!("not a Lemo address: {}", args.input))?
    };
    println!("{}", addr.to_branded());
    println!("{}", addr.to_hex());
    Ok(())
}

fn sign(args: cli::SignArgs) -> Result<()> {
    let keypair = LemoKeypair::from_hex(&args.key).context("invalid private key")?;
    let tx = build_transaction(&args, keypair.address())?;
    let signed = tx.sign(&Signer::new(), &keypair)?;

    tracing::info!(
        hash = %signed.identity_hash(),
        from = %signed.from(),
        signatures = signed.sigs().len(),
        "transaction signed"
    );
    println!("{}", signed.to_json()?);
    println!("0x{}", hex::encode(signed.to_rlp()));
    Ok(())
}

fn build_transaction(args: &cli::SignArgs, signer_address: Address) -> Result<Transaction> {
    let from = match &args.from {
        Some(text) => parse_address("--from", text)?,
        None => signer_address,
    };
    let amount = parse_amount(&args.amount)?;
    let data = decode_hex_arg("--data", &args.data)?;

    let mut builder = TransactionBuilder::new(from)
        .tx_type(TransactionType::from(args.tx_type))
        .chain_id(args.chain_id)
        .gas_price(args.gas_price)
        .gas_limit(args.gas_limit)
        .amount(amount)
        .data(data)
        .to_name(args.to_name.as_str())
        .message(args.message.as_str());
    if let Some(to) = &args.to {
        builder = builder.to(parse_address("--to", to)?);
    }
    if let Some(payer) = &args.gas_payer {
        builder = builder.gas_payer(parse_address("--gas-payer", payer)?);
    }
    if let Some(expiration) = args.expiration {
        builder = builder.expiration(expiration);
    }
    Ok(builder.build()?)
}

fn recover(args: cli::RecoverArgs) -> Result<()> {
    let text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    let tx = Transaction::from_json(&text).context("not a transaction")?;
    let signer = Signer::new();

    println!("hash      : {}", tx.identity_hash());
    println!("from      : {}", tx.from());
    for (i, addr) in tx.signers(&signer).context("signature recovery failed")?.iter().enumerate() {
        println!("signer {:<2} : {}", i, addr);
    }
    if !tx.gas_payer_sigs().is_empty() {
        for (i, addr) in tx.gas_payer_signers(&signer)?.iter().enumerate() {
            println!("payer {:<3} : {}", i, addr);
        }
    }
    match tx.verify_sender(&signer) {
        Ok(_) => println!("sender    : verified"),
        Err(e) => println!("sender    : NOT verified ({})", e),
    }
    Ok(())
}

async fn drip(args: cli::DripArgs) -> Result<()> {
    let keypair = LemoKeypair::from_hex(&args.key).context("invalid faucet key")?;
    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<FaucetConfig>(&text)
                .with_context(|| format!("invalid faucet config in {}", path.display()))?
        }
        None => FaucetConfig::default(),
    };

    std::fs::create_dir_all(&args.db_path).with_context(|| {
        format!("failed to create database directory: {}", args.db_path.display())
    })?;
    let store = SledTimestampStore::open(&args.db_path)
        .with_context(|| format!("failed to open database at {}", args.db_path.display()))?;
    let client = HttpLedgerClient::new(&args.node.rpc_url)?;

    let faucet = Dispenser::new(keypair, store, client, config);
    tracing::info!(
        faucet = %faucet.faucet_address(),
        rpc_url = %args.node.rpc_url,
        "faucet ready"
    );

    match faucet.drip_now(&args.address).await? {
        DripOutcome::Sent {
            recipient,
            tx_hash,
            ledger_handle,
            ..
        } => {
            println!("Sent {} base units to {}", faucet.config().drip_amount, recipient);
            println!("  Transaction hash : {}", tx_hash);
            println!("  Ledger handle    : {}", ledger_handle);
        }
        DripOutcome::Throttled {
            recipient,
            retry_after,
        } => {
            println!(
                "{} was served less than a day ago; try again in {}.",
                recipient,
                format_wait(retry_after)
            );
        }
    }
    Ok(())
}

async fn balance(args: cli::BalanceArgs) -> Result<()> {
    let addr = parse_address("address", &args.address)?;
    let client = HttpLedgerClient::new(&args.node.rpc_url)?;
    let balance = client
        .get_balance(&addr)
        .await
        .with_context(|| format!("balance query to {} failed", args.node.rpc_url))?;
    println!("{}", balance);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("lemo-faucet {}", env!("CARGO_PKG_VERSION"));
    println!("tx version  {}", lemo_protocol::config::TX_VERSION);
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn parse_address(what: &str, text: &str) -> Result<Address> {
    Address::parse(text).with_context(|| format!("{}: not a Lemo address: {}", what, text))
}

fn parse_amount(text: &str) -> Result<BigUint> {
    let text = text.trim().replace('_', "");
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        bail!("amount must be a non-negative decimal integer, got {:?}", text);
    }
    text.parse::<BigUint>()
        .with_context(|| format!("invalid amount {:?}", text))
}

fn decode_hex_arg(what: &str, text: &str) -> Result<Vec<u8>> {
    let stripped = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    hex::decode(stripped).with_context(|| format!("{}: invalid hex", what))
}

/// "3h 25m", rounded up to the minute.
fn format_wait(wait: Duration) -> String {
    let minutes = wait.as_secs().div_ceil(60);
    format!("{}h {}m", minutes / 60, minutes % 60)
}
