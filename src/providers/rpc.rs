//! JSON-RPC client shared by the Solana and BSC fundamentals providers
//!
//! One endpoint, one attempt. Failures go back to the provider, which turns
//! them into an absent result; there is no retry or endpoint fallback here.

use std::time::Duration;

use eyre::{eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::utils::constants::{PROVIDER_TIMEOUT_SECS, USER_AGENT as USER_AGENT_CONST};

/// Maximum requests per batch
pub const MAX_BATCH_SIZE: usize = 50;

#[derive(Debug, Clone, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    method: &'a str,
    params: &'a serde_json::Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
    #[serde(default)]
    id: u64,
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

impl RpcError {
    /// HTTP 429 equivalents (-32005 on most providers)
    pub fn is_rate_limit(&self) -> bool {
        self.code == -32005 || self.message.to_lowercase().contains("rate limit")
    }

    /// eth_call reverted (non-contract or non-ERC20 target)
    pub fn is_execution_reverted(&self) -> bool {
        self.code == 3 || self.message.to_lowercase().contains("execution reverted")
    }

    pub fn into_report(self) -> eyre::Report {
        if self.is_rate_limit() {
            eyre!("Rate limited by node: {} (code: {})", self.message, self.code)
        } else if self.is_execution_reverted() {
            eyre!("Execution reverted: {} (code: {})", self.message, self.code)
        } else {
            eyre!("RPC error: {} (code: {})", self.message, self.code)
        }
    }
}

impl<T> RpcResponse<T> {
    fn into_result(self) -> Result<T> {
        if let Some(error) = self.error {
            return Err(error.into_report());
        }
        self.result.ok_or_else(|| eyre!("No result in response for id {}", self.id))
    }
}

/// Single-endpoint JSON-RPC client
#[derive(Clone)]
pub struct JsonRpcClient {
    url: String,
    client: reqwest::Client,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_CONST));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(PROVIDER_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Endpoint with any path-embedded API key masked, for logging
    pub fn masked_url(&self) -> String {
        mask_url(&self.url)
    }

    /// Single call. `Ok(None)` when the node answers with a null result.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: serde_json::Value) -> Result<Option<T>> {
        let payload = RpcRequest {
            jsonrpc: "2.0",
            method,
            params: &params,
            id: 1,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| eyre!("Request failed: {}", e))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(eyre!("Rate limited (HTTP 429)"));
        }
        if !status.is_success() {
            return Err(eyre!("HTTP error: {}", status));
        }

        let json: RpcResponse<T> = response
            .json()
            .await
            .map_err(|e| eyre!("Failed to parse response: {}", e))?;

        if let Some(error) = json.error {
            return Err(error.into_report());
        }
        Ok(json.result)
    }

    /// Batch call. The outer `Result` is transport; each entry carries its own
    /// RPC-level outcome, returned in request order regardless of reply order.
    pub async fn batch_call<T: DeserializeOwned>(
        &self,
        requests: &[(&str, serde_json::Value)],
    ) -> Result<Vec<Result<T>>> {
        let mut all_results = Vec::with_capacity(requests.len());

        for chunk in requests.chunks(MAX_BATCH_SIZE) {
            let payload: Vec<RpcRequest> = chunk
                .iter()
                .enumerate()
                .map(|(idx, (method, params))| RpcRequest {
                    jsonrpc: "2.0",
                    method,
                    params,
                    id: idx as u64 + 1,
                })
                .collect();

            let response = self
                .client
                .post(&self.url)
                .json(&payload)
                .send()
                .await
                .map_err(|e| eyre!("Batch request failed: {}", e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(eyre!("HTTP error: {}", status));
            }

            let replies: Vec<RpcResponse<T>> = response
                .json()
                .await
                .map_err(|e| eyre!("Failed to parse batch response: {}", e))?;

            debug!("📦 Batch of {} answered with {} replies", chunk.len(), replies.len());
            all_results.extend(order_replies(replies, chunk.len()));
        }

        Ok(all_results)
    }
}

/// Slot replies by id (1-based); missing ids become errors
fn order_replies<T>(replies: Vec<RpcResponse<T>>, expected: usize) -> Vec<Result<T>> {
    let mut slots: Vec<Option<RpcResponse<T>>> = (0..expected).map(|_| None).collect();
    for reply in replies {
        let idx = reply.id as usize;
        if (1..=expected).contains(&idx) {
            slots[idx - 1] = Some(reply);
        }
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| match slot {
            Some(reply) => reply.into_result(),
            None => Err(eyre!("No reply for batch id {}", idx + 1)),
        })
        .collect()
}

fn mask_url(url: &str) -> String {
    for marker in ["/v2/", "api-key="] {
        if let Some((head, _)) = url.split_once(marker) {
            return format!("{}{}***HIDDEN***", head, marker);
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_replies_are_reordered() {
        let replies: Vec<RpcResponse<String>> = serde_json::from_str(
            r#"[
                {"jsonrpc":"2.0","id":3,"result":"0x03"},
                {"jsonrpc":"2.0","id":1,"result":"0x01"},
                {"jsonrpc":"2.0","id":2,"error":{"code":3,"message":"execution reverted"}}
            ]"#,
        )
        .unwrap();

        let ordered = order_replies(replies, 4);
        assert_eq!(ordered[0].as_deref().unwrap(), "0x01");
        let reverted = ordered[1].as_ref().unwrap_err().to_string();
        assert!(reverted.starts_with("Execution reverted"), "{}", reverted);
        assert_eq!(ordered[2].as_deref().unwrap(), "0x03");
        assert!(ordered[3].is_err());
    }

    #[test]
    fn test_rpc_error_classification() {
        let err = RpcError {
            code: -32005,
            message: "Rate limit exceeded".to_string(),
        };
        assert!(err.is_rate_limit());
        assert!(err.into_report().to_string().starts_with("Rate limited by node"));

        let err = RpcError {
            code: 3,
            message: "execution reverted".to_string(),
        };
        assert!(err.is_execution_reverted());
        assert!(err.into_report().to_string().starts_with("Execution reverted"));
    }

    #[test]
    fn test_masked_url() {
        assert_eq!(
            mask_url("https://mainnet.helius-rpc.com/?api-key=secret"),
            "https://mainnet.helius-rpc.com/?api-key=***HIDDEN***"
        );
        assert_eq!(mask_url("https://bsc-dataseed.bnbchain.org"), "https://bsc-dataseed.bnbchain.org");
    }
}
