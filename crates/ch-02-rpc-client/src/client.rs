//! Ethereum JSON-RPC client.

use crate::error::RpcError;
use crate::types::{
    parse_hex_bytes, BlockTag, CallRequest, HexBytes, JsonRpcError, JsonRpcRequest,
    JsonRpcResponse, RpcReceipt,
};
use ch_01_abi::decode_revert_reason;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use shared_types::{Address, TxHash, U256};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Ganache prefix on revert messages.
const GANACHE_REVERT: &str = "VM Exception while processing transaction: revert";
/// Geth/Erigon/Anvil prefix on revert messages.
const GETH_REVERT: &str = "execution reverted";

/// JSON-RPC client for one endpoint.
pub struct RpcClient {
    client: Client,
    endpoint: String,
    request_timeout: Duration,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a client; every request is bounded by `request_timeout`.
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(request_timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(RpcError::Http)?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            request_timeout,
            request_id: AtomicU64::new(1),
        })
    }

    /// Endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC method.
    pub async fn request<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        let id = self.next_id();
        let request = JsonRpcRequest::new(method, params, id);
        trace!(id, method, "JSON-RPC request");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    RpcError::Connection(format!("Cannot connect to {}", self.endpoint))
                } else if e.is_timeout() {
                    RpcError::Timeout {
                        what: method.to_string(),
                        waited_ms: u64::try_from(self.request_timeout.as_millis())
                            .unwrap_or(u64::MAX),
                    }
                } else {
                    RpcError::Http(e)
                }
            })?;

        let rpc_response: JsonRpcResponse<R> = response
            .json()
            .await
            .map_err(|e| RpcError::Parse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            debug!(id, method, code = error.code, message = %error.message, "JSON-RPC error");
            return Err(classify_error(error));
        }

        match rpc_response.result {
            Some(result) => Ok(result),
            // `null` results are legitimate for Option-typed methods
            None => serde_json::from_value(Value::Null)
                .map_err(|_| RpcError::Parse(format!("Missing result in {method} response"))),
        }
    }

    /// `eth_chainId`
    pub async fn chain_id(&self) -> Result<u64, RpcError> {
        let id: U256 = self.request("eth_chainId", [(); 0]).await?;
        Ok(id.low_u64())
    }

    /// `eth_accounts`; empty on hosted providers.
    pub async fn accounts(&self) -> Result<Vec<Address>, RpcError> {
        self.request("eth_accounts", [(); 0]).await
    }

    /// `eth_gasPrice`
    pub async fn gas_price(&self) -> Result<U256, RpcError> {
        self.request("eth_gasPrice", [(); 0]).await
    }

    /// `eth_getTransactionCount`, the next nonce of `address`.
    pub async fn transaction_count(&self, address: &Address, block: BlockTag) -> Result<U256, RpcError> {
        self.request("eth_getTransactionCount", (address, block)).await
    }

    /// `eth_getCode`; empty when nothing is deployed at `address`.
    pub async fn code(&self, address: &Address, block: BlockTag) -> Result<Vec<u8>, RpcError> {
        let code: HexBytes = self.request("eth_getCode", (address, block)).await?;
        Ok(code.0)
    }

    /// `eth_call` at `block`.
    pub async fn call(&self, request: &CallRequest, block: BlockTag) -> Result<Vec<u8>, RpcError> {
        let data: HexBytes = self.request("eth_call", (request, block)).await?;
        Ok(data.0)
    }

    /// `eth_estimateGas`
    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<U256, RpcError> {
        self.request("eth_estimateGas", [request]).await
    }

    /// `eth_sendTransaction` from a node-managed account.
    pub async fn send_transaction(&self, request: &CallRequest) -> Result<TxHash, RpcError> {
        self.request("eth_sendTransaction", [request]).await
    }

    /// `eth_sendRawTransaction`
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, RpcError> {
        self.request("eth_sendRawTransaction", [HexBytes(raw.to_vec())])
            .await
    }

    /// `eth_getTransactionReceipt`; `None` while the transaction is pending.
    pub async fn transaction_receipt(&self, hash: &TxHash) -> Result<Option<RpcReceipt>, RpcError> {
        self.request("eth_getTransactionReceipt", [hash]).await
    }

    /// Poll for a receipt every `poll_interval` until `timeout` elapses.
    pub async fn wait_for_receipt(
        &self,
        hash: &TxHash,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<RpcReceipt, RpcError> {
        let started = Instant::now();
        loop {
            if let Some(receipt) = self.transaction_receipt(hash).await? {
                debug!(tx = ?hash, block = %receipt.block_number, "Receipt available");
                return Ok(receipt);
            }
            if started.elapsed() >= timeout {
                return Err(RpcError::Timeout {
                    what: format!("receipt of {hash:?}"),
                    waited_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                });
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}

/// Turn a JSON-RPC error into an [`RpcError`], recognising reverts.
///
/// Revert data is looked for in `error.data` (a hex string on geth-style
/// nodes, an object keyed by transaction hash on ganache) before falling
/// back to the message text.
pub(crate) fn classify_error(error: JsonRpcError) -> RpcError {
    if let Some(reason) = error.data.as_ref().and_then(revert_reason_from_data) {
        return RpcError::Reverted {
            reason: Some(reason),
        };
    }

    let message = error.message.trim();
    for prefix in [GANACHE_REVERT, GETH_REVERT] {
        if let Some(rest) = message.strip_prefix(prefix) {
            let reason = rest.trim_start_matches(':').trim();
            return RpcError::Reverted {
                reason: (!reason.is_empty()).then(|| reason.to_string()),
            };
        }
    }

    RpcError::Rpc {
        code: error.code,
        message: error.message,
    }
}

fn revert_reason_from_data(data: &Value) -> Option<String> {
    match data {
        Value::String(hex) => parse_hex_bytes(hex)
            .ok()
            .and_then(|bytes| decode_revert_reason(&bytes)),
        Value::Object(map) => {
            if let Some(reason) = map.get("reason").and_then(Value::as_str) {
                return Some(reason.to_string());
            }
            if let Some(encoded) = map.get("return").or_else(|| map.get("data")) {
                return revert_reason_from_data(encoded);
            }
            // ganache: { "<txhash>": { "error": "revert", "reason": .. }, "stack": .. }
            map.values()
                .filter(|v| v.is_object())
                .find_map(revert_reason_from_data)
        }
        _ => None,
    }
}
