use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::wallet::units::{parse_quantity, Wei};

#[cfg(test)]
pub mod mock;
pub mod types;
mod watcher;

pub use types::{ProviderEvent, RpcReceipt, RpcTransaction, TransactionRequest};
pub use watcher::AccountWatcher;

/// EIP-1193 "user rejected the request".
pub const USER_REJECTED_CODE: i64 = 4001;
const METHOD_NOT_FOUND_CODE: i64 = -32601;
const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Wallet provider unavailable: {0}")]
    Unavailable(String),
    #[error("HTTP error: {0}")]
    Http(u16),
    #[error("User rejected the request: {0}")]
    UserRejected(String),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("Invalid provider response: {0}")]
    Decode(String),
}

/// The JSON-RPC surface the dashboard needs from a wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Accounts already authorized, without prompting.
    async fn accounts(&self) -> Result<Vec<String>, ProviderError>;

    /// Asks the wallet to authorize accounts. May prompt the user.
    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError>;

    async fn chain_id(&self) -> Result<String, ProviderError>;

    async fn get_balance(&self, address: &str) -> Result<Wei, ProviderError>;

    /// Returns the transaction hash once the wallet has signed and broadcast.
    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, ProviderError>;

    async fn get_transaction(&self, hash: &str) -> Result<Option<RpcTransaction>, ProviderError>;

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, ProviderError>;

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent>;
}

#[derive(Debug, Clone)]
pub struct JsonRpcProvider {
    client: Client,
    url: String,
    next_id: Arc<AtomicU64>,
    events: broadcast::Sender<ProviderEvent>,
}

impl JsonRpcProvider {
    pub fn new(url: String, request_timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        info!("Initialized wallet provider client for: {}", url);
        Self {
            client,
            url,
            next_id: Arc::new(AtomicU64::new(1)),
            events,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub(crate) fn emit(&self, event: ProviderEvent) {
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(event);
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!("RPC request {} {} {}", id, method, params);

        let response = self
            .client
            .post(&self.url)
            .json(&json!({
                "jsonrpc": "2.0",
                "method": method,
                "params": params,
                "id": id
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            warn!("{} returned HTTP {}", method, response.status());
            return Err(ProviderError::Http(response.status().as_u16()));
        }

        let json_response = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        decode_response(json_response)
    }
}

/// Splits a JSON-RPC response envelope into its result or a typed error.
pub fn decode_response<T: DeserializeOwned>(mut response: Value) -> Result<T, ProviderError> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let code = error["code"].as_i64().unwrap_or_default();
        let message = error["message"].as_str().unwrap_or("unknown error").to_string();
        if code == USER_REJECTED_CODE {
            return Err(ProviderError::UserRejected(message));
        }
        return Err(ProviderError::Rpc { code, message });
    }

    let result = response
        .get_mut("result")
        .map(Value::take)
        .ok_or_else(|| ProviderError::Decode("response has neither result nor error".to_string()))?;
    serde_json::from_value(result).map_err(|e| ProviderError::Decode(e.to_string()))
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn accounts(&self) -> Result<Vec<String>, ProviderError> {
        self.request("eth_accounts", json!([])).await
    }

    async fn request_accounts(&self) -> Result<Vec<String>, ProviderError> {
        match self.request("eth_requestAccounts", json!([])).await {
            // Plain nodes have no authorization step, their accounts are
            // already exposed.
            Err(ProviderError::Rpc { code, .. }) if code == METHOD_NOT_FOUND_CODE => {
                debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.accounts().await
            }
            other => other,
        }
    }

    async fn chain_id(&self) -> Result<String, ProviderError> {
        self.request("eth_chainId", json!([])).await
    }

    async fn get_balance(&self, address: &str) -> Result<Wei, ProviderError> {
        let raw: String = self.request("eth_getBalance", json!([address, "latest"])).await?;
        parse_quantity(&raw).ok_or_else(|| ProviderError::Decode(format!("invalid balance quantity '{}'", raw)))
    }

    async fn send_transaction(&self, request: &TransactionRequest) -> Result<String, ProviderError> {
        self.request("eth_sendTransaction", json!([request])).await
    }

    async fn get_transaction(&self, hash: &str) -> Result<Option<RpcTransaction>, ProviderError> {
        self.request("eth_getTransactionByHash", json!([hash])).await
    }

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<RpcReceipt>, ProviderError> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    fn subscribe(&self) -> broadcast::Receiver<ProviderEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_result() {
        let accounts: Vec<String> =
            decode_response(json!({"jsonrpc": "2.0", "id": 1, "result": ["0xabc"]})).unwrap();
        assert_eq!(accounts, vec!["0xabc".to_string()]);
    }

    #[test]
    fn test_decode_null_result_as_none() {
        let receipt: Option<RpcReceipt> =
            decode_response(json!({"jsonrpc": "2.0", "id": 1, "result": null})).unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn test_decode_user_rejection() {
        let err = decode_response::<Vec<String>>(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 4001, "message": "User rejected the request."}
        }))
        .unwrap_err();
        assert!(matches!(err, ProviderError::UserRejected(_)));
    }

    #[test]
    fn test_decode_rpc_error() {
        let err = decode_response::<String>(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32000, "message": "insufficient funds"}
        }))
        .unwrap_err();
        match err {
            ProviderError::Rpc { code, message } => {
                assert_eq!(code, -32000);
                assert_eq!(message, "insufficient funds");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_missing_result() {
        let err = decode_response::<String>(json!({"jsonrpc": "2.0", "id": 1})).unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_provider_is_unavailable() {
        // Port 9 (discard) is closed on test machines.
        let provider = JsonRpcProvider::new("http://127.0.0.1:9".to_string(), Duration::from_secs(2));
        let err = provider.accounts().await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
