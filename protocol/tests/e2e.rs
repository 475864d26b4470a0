//! End-to-end integration tests for the Lemo client library.
//!
//! These exercise the public API the way a wallet or the faucet binary
//! does: derive an account from a key, build and sign transactions, move
//! them through both wire formats, and run a full faucet grant against a
//! ledger node stood up on a local socket.
//!
//! Each test owns its keys, stores and listeners. No shared state.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use lemo_protocol::crypto::{LemoKeypair, Signer};
use lemo_protocol::faucet::{Dispenser, DripOutcome, FaucetConfig};
use lemo_protocol::identity::Address;
use lemo_protocol::network::{HttpLedgerClient, RpcRequest};
use lemo_protocol::storage::{SledTimestampStore, TimestampStore};
use lemo_protocol::transaction::{
    split_v, BoxPayload, SigningState, Transaction, TransactionBuilder, TransactionType,
};

const FAUCET_KEY: &str = "c21b6b2fbf230f665b936194d14da67187732bf9d28768aef1a3cbb26608f8aa";
const FAUCET_BRANDED: &str = "Lemo83GN72GYH2NZ8BA729Z9TCT7KQ5FC3CR6DJG";
const FAUCET_HEX: &str = "0x015780f8456f9c1532645087a19dcf9a7e0c7f97";
const RECIPIENT: &str = "Lemo83W7HDZYS33Z745NZ2FGF37565DSF5AHJZ4J";
const RECIPIENT_HEX: &str = "0x01aa3babd3ffbb84a6281a7ad6a41ee06cb7f5db";

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn transfer(from: Address, to: Address) -> Transaction {
    TransactionBuilder::new(from)
        .to(to)
        .to_name("alice")
        .chain_id(100)
        .gas_price(3_000_000_000u64)
        .gas_limit(2_000_000)
        .amount(10_000_000_000_000_000_000u64)
        .data(b"hi".to_vec())
        .expiration(1_700_000_000)
        .message("integration")
        .build()
        .expect("valid transaction")
}

/// A one-connection JSON-RPC node: answers every call with `result`,
/// records the requests it saw.
async fn fake_node(
    result: &'static str,
    calls: usize,
) -> (String, tokio::task::JoinHandle<Vec<RpcRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = tokio::spawn(async move {
        let mut seen = Vec::new();
        for _ in 0..calls {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 2048];
            let body = loop {
                let n = sock.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending a full request");
                buf.extend_from_slice(&chunk[..n]);
                let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
                let len: usize = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + len {
                    break buf[pos + 4..pos + 4 + len].to_vec();
                }
            };
            let req: RpcRequest = serde_json::from_slice(&body).unwrap();
            let payload = format!(r#"{{"jsonrpc":"2.0","id":{},"result":"{}"}}"#, req.id, result);
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                payload.len(),
                payload
            );
            sock.write_all(response.as_bytes()).await.unwrap();
            sock.shutdown().await.unwrap();
            seen.push(req);
        }
        seen
    });
    (url, handle)
}

// ---------------------------------------------------------------------------
// 1. Keys and Addresses
// ---------------------------------------------------------------------------

#[test]
fn known_key_derives_known_address() {
    let kp = LemoKeypair::from_hex(FAUCET_KEY).unwrap();
    let addr = kp.address();
    assert_eq!(addr.to_branded(), FAUCET_BRANDED);
    assert_eq!(addr.to_hex(), FAUCET_HEX);
    assert_eq!(Address::parse(FAUCET_BRANDED).unwrap(), addr);
    assert_eq!(Address::parse(FAUCET_HEX).unwrap(), addr);
}

#[test]
fn branded_and_hex_forms_agree() {
    let a = Address::parse(RECIPIENT).unwrap();
    let b = Address::parse(RECIPIENT_HEX).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_string(), RECIPIENT);
    assert_eq!(Address::parse(&RECIPIENT.to_lowercase()).unwrap(), a);
}

// ---------------------------------------------------------------------------
// 2. Transaction Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn sign_countersign_and_verify() {
    let signer = Signer::new();
    let alice = LemoKeypair::generate();
    let bob = LemoKeypair::generate();
    let payer = LemoKeypair::generate();

    let unsigned = TransactionBuilder::new(alice.address())
        .to(Address::parse(RECIPIENT).unwrap())
        .gas_payer(payer.address())
        .chain_id(100)
        .amount(1u64)
        .expiration(1_700_000_000)
        .build()
        .unwrap();
    assert_eq!(unsigned.state(), SigningState::Unsigned);

    let signed = unsigned
        .sign(&signer, &alice)
        .unwrap()
        .sign(&signer, &bob)
        .unwrap();
    assert_eq!(signed.state(), SigningState::Signed);
    assert_eq!(signed.signers(&signer).unwrap(), vec![alice.address(), bob.address()]);
    assert_eq!(signed.verify_sender(&signer).unwrap(), alice.address());

    let countersigned = signed.sign_as_gas_payer(&signer, &payer).unwrap();
    assert_eq!(countersigned.state(), SigningState::Countersigned);
    assert_eq!(
        countersigned.gas_payer_signers(&signer).unwrap(),
        vec![payer.address()]
    );
    assert_eq!(countersigned.signing_hash(), unsigned.signing_hash());

    let hashes = [
        unsigned.identity_hash(),
        signed.identity_hash(),
        countersigned.identity_hash(),
    ];
    assert_ne!(hashes[0], hashes[1]);
    assert_ne!(hashes[1], hashes[2]);
}

#[test]
fn wire_formats_preserve_identity() {
    let signer = Signer::new();
    let kp = LemoKeypair::generate();
    let tx = transfer(kp.address(), Address::parse(RECIPIENT).unwrap())
        .sign(&signer, &kp)
        .unwrap();

    let from_rlp = Transaction::from_rlp(&tx.to_rlp()).unwrap();
    assert_eq!(from_rlp, tx);
    assert_eq!(from_rlp.identity_hash(), tx.identity_hash());

    let json = tx.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["hash"], serde_json::json!(tx.identity_hash().to_hex()));
    assert_eq!(value["to"], serde_json::json!(RECIPIENT));
    assert_eq!(value["amount"], serde_json::json!("10000000000000000000"));

    let from_json = Transaction::from_json(&json).unwrap();
    assert_eq!(from_json.identity_hash(), tx.identity_hash());
    assert_eq!(from_json.verify_sender(&signer).unwrap(), kp.address());
}

#[test]
fn packed_v_carries_type_version_and_chain() {
    let signer = Signer::new();
    let kp = LemoKeypair::generate();
    let tx = TransactionBuilder::new(kp.address())
        .tx_type(TransactionType::TransferAsset)
        .chain_id(1)
        .expiration(1_700_000_000)
        .build()
        .unwrap()
        .sign(&signer, &kp)
        .unwrap();
    let (tx_type, version, bit, chain) = split_v(tx.packed_v());
    assert_eq!(tx_type, TransactionType::TransferAsset.code());
    assert_eq!(version, 1);
    assert_eq!(bit, tx.sigs()[0].recovery_bit());
    assert_eq!(chain, 1);
}

#[test]
fn box_hash_ignores_payload_formatting() {
    let signer = Signer::new();
    let kp = LemoKeypair::generate();
    let to = Address::parse(RECIPIENT).unwrap();
    let subs = vec![
        transfer(kp.address(), to).sign(&signer, &kp).unwrap(),
        transfer(kp.address(), kp.address()).sign(&signer, &kp).unwrap(),
    ];
    let payload = BoxPayload::new(subs);

    let compact = payload.to_bytes().unwrap();
    let pretty = serde_json::to_vec_pretty(&payload).unwrap();
    assert_ne!(compact, pretty);

    let boxed = |data: Vec<u8>| {
        TransactionBuilder::new(kp.address())
            .tx_type(TransactionType::Box)
            .chain_id(100)
            .data(data)
            .expiration(1_700_000_000)
            .build()
            .unwrap()
    };
    assert_eq!(boxed(compact).signing_hash(), boxed(pretty).signing_hash());

    // Outside a box the same bytes are hashed as-is.
    let plain = |data: Vec<u8>| {
        TransactionBuilder::new(kp.address())
            .chain_id(100)
            .data(data)
            .expiration(1_700_000_000)
            .build()
            .unwrap()
    };
    assert_ne!(
        plain(payload.to_bytes().unwrap()).signing_hash(),
        plain(serde_json::to_vec_pretty(&payload).unwrap()).signing_hash()
    );
}

// ---------------------------------------------------------------------------
// 3. Faucet Against a Local Node
// ---------------------------------------------------------------------------

#[tokio::test]
async fn faucet_grant_over_http_with_sled() {
    let dir = tempfile::tempdir().unwrap();
    let (url, node) = fake_node("0x1234", 2).await;

    let client = HttpLedgerClient::new(&url)
        .unwrap()
        .with_timeout(Duration::from_secs(5));
    let store = SledTimestampStore::open(dir.path()).unwrap();
    let faucet = Dispenser::new(
        LemoKeypair::from_hex(FAUCET_KEY).unwrap(),
        store,
        client,
        FaucetConfig::default(),
    );

    let now = 1_700_000_000;
    match faucet.drip(RECIPIENT_HEX, now).await.unwrap() {
        DripOutcome::Sent {
            ledger_handle,
            first_request,
            ..
        } => {
            assert_eq!(ledger_handle, "0x1234");
            assert!(first_request);
        }
        other => panic!("expected Sent, got {:?}", other),
    }
    assert!(matches!(
        faucet.drip(RECIPIENT, now + 10).await.unwrap(),
        DripOutcome::Throttled { .. }
    ));
    assert_eq!(faucet.balance(RECIPIENT).await.unwrap(), "0x1234");

    let seen = node.await.unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].method, "tx_sendTx");
    assert_eq!(seen[1].method, "account_getBalance");
    assert_eq!(seen[1].params, vec![serde_json::json!(RECIPIENT)]);

    let submitted: Transaction = serde_json::from_value(seen[0].params[0].clone()).unwrap();
    assert_eq!(submitted.verify_sender(&Signer::new()).unwrap().to_branded(), FAUCET_BRANDED);
    assert_eq!(submitted.to().unwrap().to_branded(), RECIPIENT);
    assert_eq!(submitted.expiration(), now + 1_800);
    assert_eq!(faucet.store().get(RECIPIENT).unwrap(), now + 1_800);
}
