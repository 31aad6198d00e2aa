//! JSON-RPC wire types.
//!
//! Quantities (`U256`) and hashes (`H160`, `H256`) use the `0x`-hex serde
//! impls from `primitive-types`; byte strings go through [`HexBytes`].

use ch_01_abi::{decode_log, RawLog};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use shared_types::{Address, EmittedEvent, TxHash, TxReceipt, H256, U256};
use std::fmt;
use tracing::debug;

/// JSON-RPC request envelope.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC response envelope.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    #[serde(default)]
    pub id: u64,
    pub result: Option<T>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

/// Arbitrary bytes as a `0x`-prefixed hex string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl From<Vec<u8>> for HexBytes {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Serialize for HexBytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(&self.0)))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_hex_bytes(&s).map(Self).map_err(de::Error::custom)
    }
}

/// Decode a `0x`-prefixed (or bare) hex string.
pub fn parse_hex_bytes(s: &str) -> Result<Vec<u8>, String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits).map_err(|e| format!("invalid hex bytes {s:?}: {e}"))
}

/// Parameters of `eth_call`, `eth_estimateGas` and `eth_sendTransaction`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    pub data: HexBytes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas: Option<U256>,
    #[serde(rename = "gasPrice", skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<U256>,
}

impl CallRequest {
    /// Call `to` with `data` and no sender.
    #[must_use]
    pub fn new(to: Address, data: Vec<u8>) -> Self {
        Self {
            to,
            data: HexBytes(data),
            ..Self::default()
        }
    }

    /// Set the sender.
    #[must_use]
    pub fn sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Set the gas limit.
    #[must_use]
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(U256::from(gas));
        self
    }
}

/// Block selector for state queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Latest,
    Pending,
    Number(u64),
}

impl Serialize for BlockTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Latest => serializer.serialize_str("latest"),
            Self::Pending => serializer.serialize_str("pending"),
            Self::Number(n) => serializer.serialize_str(&format!("0x{n:x}")),
        }
    }
}

/// A log entry of a receipt.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcLog {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: HexBytes,
}

/// `eth_getTransactionReceipt` result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: TxHash,
    pub block_number: U256,
    /// Absent on pre-byzantium chains; byzantium is the lowest EVM version
    /// the harness compiles for, so a missing status is treated as failure.
    #[serde(default)]
    pub status: Option<U256>,
    pub gas_used: U256,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
}

impl RpcReceipt {
    /// True when the transaction executed without reverting.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status.is_some_and(|s| s == U256::one())
    }

    /// Convert into the domain receipt, decoding every log the deed
    /// contracts define. Unknown and malformed logs are skipped.
    #[must_use]
    pub fn into_receipt(self) -> TxReceipt {
        let status = self.succeeded();
        let block_number = self.block_number.low_u64();
        let tx_hash = self.transaction_hash;

        let events = self
            .logs
            .into_iter()
            .filter_map(|log| {
                let raw = RawLog {
                    address: log.address,
                    topics: log.topics,
                    data: log.data.0,
                };
                match decode_log(&raw) {
                    Ok(Some(event)) => Some(EmittedEvent {
                        contract: raw.address,
                        event,
                        tx_hash: Some(tx_hash),
                        block_number: Some(block_number),
                    }),
                    Ok(None) => None,
                    Err(e) => {
                        debug!(contract = ?raw.address, error = %e, "Skipping malformed log");
                        None
                    }
                }
            })
            .collect();

        TxReceipt {
            tx_hash,
            block_number,
            status,
            gas_used: self.gas_used,
            events,
        }
    }
}
