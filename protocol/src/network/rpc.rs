//! # JSON-RPC Envelope
//!
//! The ledger node speaks JSON-RPC 2.0 over HTTP. We only ever call two of
//! its methods:
//!
//! | Method                | Params                 | Result                       |
//! |-----------------------|------------------------|------------------------------|
//! | `tx_sendTx`           | `[<transaction JSON>]` | transaction handle (string)  |
//! | `account_getBalance`  | `["Lemo…"]`            | balance, decimal (string)    |
//!
//! This module holds the envelope types and the [`LedgerClient`] seam the
//! faucet is written against. The transport lives in [`super::http`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::JSONRPC_VERSION;
use crate::identity::Address;
use crate::transaction::Transaction;

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Always "2.0".
    pub jsonrpc: String,
    /// Echoed back in the response.
    pub id: u64,
    pub method: String,
    /// Positional parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<serde_json::Value>,
}

impl RpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Vec<serde_json::Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC 2.0 response.
///
/// A conforming node sets exactly one of `result` and `error`.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: serde_json::Value,
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

impl RpcResponse {
    /// The result as a string, which is what both ledger methods return.
    ///
    /// An error object wins over a result if a node sends both.
    pub fn into_string_result(self) -> Result<String, RpcClientError> {
        if let Some(err) = self.error {
            return Err(RpcClientError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        match self.result {
            Some(serde_json::Value::String(s)) => Ok(s),
            Some(other) => Err(RpcClientError::UnexpectedResult(other.to_string())),
            None => Err(RpcClientError::MissingResult),
        }
    }
}

/// JSON-RPC 2.0 error object as the node sends it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Client Errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong talking to a ledger node.
#[derive(Debug, thiserror::Error)]
pub enum RpcClientError {
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("HTTP status {status}")]
    Http { status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ledger error {code}: {message}")]
    Rpc { code: i32, message: String },

    #[error("response carries neither result nor error")]
    MissingResult,

    #[error("unexpected result: {0}")]
    UnexpectedResult(String),
}

// ---------------------------------------------------------------------------
// Ledger Client
// ---------------------------------------------------------------------------

/// The ledger operations the faucet needs.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Submits a signed transaction and returns the ledger's handle for it.
    async fn send_transaction(&self, tx: &Transaction) -> Result<String, RpcClientError>;

    /// Current balance of `address` as the ledger formats it.
    async fn get_balance(&self, address: &Address) -> Result<String, RpcClientError>;
}

/// Params for `tx_sendTx`.
pub fn send_tx_params(tx: &Transaction) -> Result<Vec<serde_json::Value>, RpcClientError> {
    Ok(vec![serde_json::to_value(tx)?])
}

/// Params for `account_getBalance`. The ledger wants the branded form.
pub fn get_balance_params(address: &Address) -> Vec<serde_json::Value> {
    vec![serde_json::Value::String(address.to_branded())]
}
