//! JSON-RPC over HTTP, on `reqwest`.
//!
//! One POST per call with a per-call timeout. The underlying client pools
//! connections, so a long-running faucet does not reconnect for every grant.
//! Proxy environment variables are ignored: the node is dialed directly.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::{debug, trace};

use super::rpc::{
    get_balance_params, send_tx_params, LedgerClient, RpcClientError, RpcRequest, RpcResponse,
};
use crate::config::{RPC_GET_BALANCE, RPC_SEND_TX, RPC_TIMEOUT};
use crate::identity::Address;
use crate::transaction::Transaction;

/// JSON-RPC client for a single ledger node.
#[derive(Debug)]
pub struct HttpLedgerClient {
    client: Client,
    endpoint: Url,
    timeout: Duration,
    next_id: AtomicU64,
}

impl HttpLedgerClient {
    /// Creates a client for `endpoint`, e.g. `http://127.0.0.1:8001`.
    /// A bare `host:port` is taken as `http`.
    pub fn new(endpoint: &str) -> Result<Self, RpcClientError> {
        let endpoint = parse_endpoint(endpoint)?;
        let client = Client::builder()
            .timeout(RPC_TIMEOUT)
            .no_proxy()
            .build()
            .map_err(RpcClientError::Transport)?;

        Ok(Self {
            client,
            endpoint,
            timeout: RPC_TIMEOUT,
            next_id: AtomicU64::new(1),
        })
    }

    /// Overrides the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The URL calls are posted to.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Sends one JSON-RPC call and returns the decoded response envelope.
    pub async fn call(
        &self,
        method: &str,
        params: Vec<serde_json::Value>,
    ) -> Result<RpcResponse, RpcClientError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        debug!(method, id, endpoint = %self.endpoint, "json-rpc call");

        let response = self
            .client
            .post(self.endpoint.clone())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            return Err(RpcClientError::Http {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        trace!(body = %String::from_utf8_lossy(&body), "json-rpc response");
        Ok(serde_json::from_slice(&body)?)
    }

    fn transport_error(&self, err: reqwest::Error) -> RpcClientError {
        if err.is_timeout() {
            RpcClientError::Timeout(self.timeout)
        } else {
            RpcClientError::Transport(err)
        }
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn send_transaction(&self, tx: &Transaction) -> Result<String, RpcClientError> {
        self.call(RPC_SEND_TX, send_tx_params(tx)?)
            .await?
            .into_string_result()
    }

    async fn get_balance(&self, address: &Address) -> Result<String, RpcClientError> {
        self.call(RPC_GET_BALANCE, get_balance_params(address))
            .await?
            .into_string_result()
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, RpcClientError> {
    let trimmed = endpoint.trim();
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let url = Url::parse(&candidate)
        .map_err(|e| RpcClientError::InvalidUrl(format!("{}: {}", endpoint, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(RpcClientError::InvalidUrl(format!(
            "{}: unsupported scheme {:?}",
            endpoint,
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(RpcClientError::InvalidUrl(format!("{}: missing host", endpoint)));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{LemoKeypair, Signer};
    use crate::transaction::TransactionBuilder;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves exactly one request with the raw `response` bytes and hands
    /// back the request head (lowercased) and body.
    async fn one_shot_server(
        response: Vec<u8>,
    ) -> (String, tokio::task::JoinHandle<(String, String)>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            let (head, body) = loop {
                let n = sock.read(&mut chunk).await.unwrap();
                assert!(n > 0, "client closed before sending a full request");
                buf.extend_from_slice(&chunk[..n]);
                let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                    continue;
                };
                let head = String::from_utf8_lossy(&buf[..pos]).to_ascii_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= pos + 4 + len {
                    let body = String::from_utf8_lossy(&buf[pos + 4..pos + 4 + len]).to_string();
                    break (head, body);
                }
            };
            sock.write_all(&response).await.unwrap();
            sock.shutdown().await.unwrap();
            (head, body)
        });
        (format!("http://{}", addr), handle)
    }

    fn ok_json(body: &str) -> Vec<u8> {
        format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            body.len(),
            body
        )
        .into_bytes()
    }

    #[test]
    fn rejects_bad_endpoints() {
        for bad in ["not a url", "ftp://node.example", "http://:8001", "http://node:http"] {
            assert!(
                matches!(HttpLedgerClient::new(bad), Err(RpcClientError::InvalidUrl(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn endpoint_forms() {
        let client = HttpLedgerClient::new("127.0.0.1:8001").unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:8001/");
        let client = HttpLedgerClient::new("http://10.0.0.1:8001/rpc?x=1").unwrap();
        assert_eq!(client.endpoint(), "http://10.0.0.1:8001/rpc?x=1");
        assert!(HttpLedgerClient::new("https://node.example").is_ok());
    }

    #[tokio::test]
    async fn get_balance_round_trip() {
        let (url, server) = one_shot_server(ok_json(
            r#"{"jsonrpc":"2.0","id":1,"result":"1600000000000000000000"}"#,
        ))
        .await;
        let client = HttpLedgerClient::new(&url).unwrap();
        let addr = Address::from_bytes([7; 20]);

        let balance = client.get_balance(&addr).await.unwrap();
        assert_eq!(balance, "1600000000000000000000");

        let (head, body) = server.await.unwrap();
        assert!(head.starts_with("post / http/1.1\r\n"));
        assert!(head.contains("content-type: application/json"));
        let req: RpcRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.method, RPC_GET_BALANCE);
        assert_eq!(req.params, vec![serde_json::json!(addr.to_branded())]);
    }

    #[tokio::test]
    async fn send_transaction_posts_signed_json() {
        let (url, server) =
            one_shot_server(ok_json(r#"{"jsonrpc":"2.0","id":1,"result":"0xfeed"}"#)).await;
        let client = HttpLedgerClient::new(&url).unwrap();

        let signer = Signer::new();
        let kp = LemoKeypair::generate();
        let tx = TransactionBuilder::new(kp.address())
            .to(Address::from_bytes([9; 20]))
            .chain_id(100)
            .amount(5u64)
            .expiration(1_700_000_000)
            .build()
            .unwrap()
            .sign(&signer, &kp)
            .unwrap();

        assert_eq!(client.send_transaction(&tx).await.unwrap(), "0xfeed");

        let (_, body) = server.await.unwrap();
        let req: RpcRequest = serde_json::from_str(&body).unwrap();
        assert_eq!(req.method, RPC_SEND_TX);
        let sent: Transaction = serde_json::from_value(req.params[0].clone()).unwrap();
        assert_eq!(sent.identity_hash(), tx.identity_hash());
    }

    #[tokio::test]
    async fn ledger_error_surfaces() {
        let (url, _server) = one_shot_server(ok_json(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"insufficient balance"}}"#,
        ))
        .await;
        let client = HttpLedgerClient::new(&url).unwrap();
        let err = client.get_balance(&Address::ZERO).await.unwrap_err();
        assert!(matches!(err, RpcClientError::Rpc { code: -32000, .. }));
    }

    #[tokio::test]
    async fn non_2xx_is_an_error() {
        let (url, _server) = one_shot_server(
            b"HTTP/1.1 502 Bad Gateway\r\nContent-Length: 0\r\nConnection: close\r\n\r\n".to_vec(),
        )
        .await;
        let client = HttpLedgerClient::new(&url).unwrap();
        assert!(matches!(
            client.get_balance(&Address::ZERO).await,
            Err(RpcClientError::Http { status: 502 })
        ));
    }

    #[tokio::test]
    async fn oversized_chunk_is_a_transport_error() {
        let (url, _server) = one_shot_server(
            b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\nConnection: close\r\n\r\nffffffffffffffff\r\nab\r\n0\r\n\r\n"
                .to_vec(),
        )
        .await;
        let client = HttpLedgerClient::new(&url).unwrap();
        assert!(matches!(
            client.get_balance(&Address::ZERO).await,
            Err(RpcClientError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn garbage_body_is_a_json_error() {
        let (url, _server) = one_shot_server(ok_json("not json")).await;
        let client = HttpLedgerClient::new(&url).unwrap();
        assert!(matches!(
            client.get_balance(&Address::ZERO).await,
            Err(RpcClientError::Json(_))
        ));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let _hold = tokio::spawn(async move {
            let (sock, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(sock);
        });
        let client = HttpLedgerClient::new(&url)
            .unwrap()
            .with_timeout(Duration::from_millis(100));
        assert!(matches!(
            client.get_balance(&Address::ZERO).await,
            Err(RpcClientError::Timeout(_))
        ));
    }
}
