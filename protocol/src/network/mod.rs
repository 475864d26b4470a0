//! # Network Module
//!
//! Outbound JSON-RPC to a Lemo ledger node.
//!
//! ```text
//! rpc.rs   — Envelope types, client errors, the LedgerClient trait
//! http.rs  — HttpLedgerClient, JSON-RPC POSTs through reqwest
//! ```
//!
//! The faucet depends on [`LedgerClient`], not on the HTTP client, so tests
//! swap in an in-process fake.

pub mod http;
pub mod rpc;

pub use http::HttpLedgerClient;
pub use rpc::{LedgerClient, RpcClientError, RpcErrorObject, RpcRequest, RpcResponse};
