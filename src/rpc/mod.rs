/*
 * RPC client module for the Solana JSON-RPC endpoint
 */

use crate::models::{Result, WalletError};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

pub struct RpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

impl RpcClient {
    #[must_use]
    pub fn new(url: &str) -> Self {
        Self {
            client: Client::new(),
            url: url.to_string(),
            next_id: AtomicU64::new(1),
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .json::<RpcResponse<T>>()
            .await
            .map_err(|e| WalletError::RpcError(format!("Failed to parse {method} response: {e}")))?;

        if let Some(err) = response.error {
            return Err(WalletError::RpcError(format!(
                "{method} failed ({}): {}",
                err.code, err.message
            )));
        }

        response
            .result
            .ok_or_else(|| WalletError::RpcError(format!("{method} returned no result")))
    }

    /// Returns `Ok(())` when the node reports itself healthy.
    pub async fn get_health(&self) -> Result<()> {
        let status: String = self.call("getHealth", json!([])).await?;
        if status == "ok" {
            Ok(())
        } else {
            Err(WalletError::RpcError(format!("Node unhealthy: {status}")))
        }
    }

    /// Submits a base64-encoded transaction and returns its signature.
    pub async fn send_transaction(&self, transaction_base64: &str) -> Result<String> {
        self.call(
            "sendTransaction",
            json!([transaction_base64, { "encoding": "base64", "skipPreflight": false }]),
        )
        .await
    }
}
