//! Read-only JSON-RPC client.
//!
//! Talks to a Celo node over HTTP for view calls, dry-run simulations,
//! gas estimation and receipt polling. Nothing here signs anything.

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use gloo_net::http::Request;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::{DEFAULT_RPC, FORNO_RPC};
use crate::contracts::{revert_reason, REVERT_WITHOUT_REASON};
use crate::types::{AppError, AppResult};

static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
}

/// Error object of a failed JSON-RPC call.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcErrorObject {
    /// Revert payload, either as a bare hex string or nested under `data`.
    fn revert_data(&self) -> Option<Bytes> {
        let hex = match self.data.as_ref()? {
            Value::String(s) => s.as_str(),
            Value::Object(map) => map.get("data")?.as_str()?,
            _ => return None,
        };
        Bytes::from_str(hex).ok()
    }

    pub fn into_app_error(self) -> AppError {
        if let Some(data) = self.revert_data() {
            return AppError::Reverted(revert_reason(&data));
        }
        if let Some(rest) = self.message.strip_prefix("execution reverted") {
            let reason = rest.trim_start_matches(':').trim();
            return AppError::Reverted(if reason.is_empty() {
                REVERT_WITHOUT_REASON.to_string()
            } else {
                reason.to_string()
            });
        }
        AppError::Rpc {
            code: self.code,
            message: self.message,
        }
    }
}

impl RpcResponse {
    /// Result value, or the mapped error. A missing result reads as `null`.
    pub fn into_result(self) -> AppResult<Value> {
        match self.error {
            Some(err) => Err(err.into_app_error()),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Transaction receipt fields the UI cares about.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: String,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` on success, `0x0` on revert
    #[serde(default)]
    pub status: Option<String>,
}

impl TransactionReceipt {
    pub fn succeeded(&self) -> bool {
        self.status
            .as_deref()
            .map(|s| parse_quantity(s).map(|v| !v.is_zero()).unwrap_or(false))
            .unwrap_or(true)
    }

    pub fn block(&self) -> Option<u64> {
        self.block_number
            .as_deref()
            .and_then(|b| parse_quantity(b).ok())
            .and_then(|v| u64::try_from(v).ok())
    }
}

/// Parse a hex quantity (`0x1a`) as returned by the node.
pub fn parse_quantity(text: &str) -> AppResult<U256> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, 16)
        .map_err(|e| AppError::Decode(format!("invalid quantity {}: {}", text, e)))
}

fn parse_quantity_u64(text: &str) -> AppResult<u64> {
    let value = parse_quantity(text)?;
    u64::try_from(value).map_err(|_| AppError::Decode(format!("quantity out of range: {}", text)))
}

fn as_str(value: &Value) -> AppResult<&str> {
    value
        .as_str()
        .ok_or_else(|| AppError::Decode(format!("expected hex string, got {}", value)))
}

/// `eth_call` / `eth_estimateGas` transaction object.
pub fn call_object(from: Option<Address>, to: Address, data: &[u8]) -> Value {
    let mut obj = json!({
        "to": to.to_string(),
        "data": Bytes::copy_from_slice(data).to_string(),
    });
    if let Some(from) = from {
        obj["from"] = Value::String(from.to_string());
    }
    obj
}

/// JSON-RPC client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Client used for balance reads.
    pub fn public() -> Self {
        Self::new(DEFAULT_RPC)
    }

    /// Client used for vault reads, simulations and gas estimation.
    pub fn forno() -> Self {
        Self::new(FORNO_RPC)
    }

    /// Send one JSON-RPC request and deserialize its result.
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> AppResult<T> {
        let payload = RpcRequest {
            jsonrpc: "2.0",
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = Request::post(&self.url)
            .json(&payload)
            .map_err(|e| AppError::Network(format!("Failed to build request: {}", e)))?
            .send()
            .await
            .map_err(|e| AppError::Network(format!("{} failed: {}", method, e)))?;

        if !response.ok() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Network(format!(
                "Server error ({}): {}",
                response.status(),
                body
            )));
        }

        let envelope: RpcResponse = response
            .json()
            .await
            .map_err(|e| AppError::Decode(format!("Invalid JSON-RPC response: {}", e)))?;

        let result = envelope.into_result()?;
        serde_json::from_value(result)
            .map_err(|e| AppError::Decode(format!("Unexpected {} result: {}", method, e)))
    }

    pub async fn gas_price(&self) -> AppResult<U256> {
        let hex: String = self.request("eth_gasPrice", json!([])).await?;
        parse_quantity(&hex)
    }

    /// `eth_call` against the latest block.
    pub async fn call(&self, from: Option<Address>, to: Address, data: &[u8]) -> AppResult<Bytes> {
        let result: Value = self
            .request("eth_call", json!([call_object(from, to, data), "latest"]))
            .await?;
        Bytes::from_str(as_str(&result)?)
            .map_err(|e| AppError::Decode(format!("invalid call result: {}", e)))
    }

    pub async fn estimate_gas(&self, from: Address, to: Address, data: &[u8]) -> AppResult<u64> {
        let hex: String = self
            .request("eth_estimateGas", json!([call_object(Some(from), to, data)]))
            .await?;
        parse_quantity_u64(&hex)
    }

    /// `None` while the transaction is still pending.
    pub async fn transaction_receipt(&self, hash: &str) -> AppResult<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", json!([hash])).await
    }

    /// Call a view function and decode its return value.
    pub async fn read<C: SolCall>(&self, to: Address, call: &C) -> AppResult<C::Return> {
        self.simulate(None, to, call).await
    }

    /// Dry-run a state-changing call as `from`; reverts surface as
    /// [`AppError::Reverted`].
    pub async fn simulate<C: SolCall>(
        &self,
        from: Option<Address>,
        to: Address,
        call: &C,
    ) -> AppResult<C::Return> {
        let raw = self.call(from, to, &call.abi_encode()).await?;
        C::abi_decode_returns(&raw).map_err(|e| {
            AppError::Decode(format!("{} returned undecodable data: {}", C::SIGNATURE, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;
    use alloy::sol_types::{Revert, SolError};

    fn response(json: &str) -> RpcResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_successful_response() {
        let value = response(r#"{"jsonrpc":"2.0","id":1,"result":"0xaef3"}"#)
            .into_result()
            .unwrap();
        assert_eq!(parse_quantity_u64(value.as_str().unwrap()).unwrap(), 44787);
    }

    #[test]
    fn test_null_result_is_pending_receipt() {
        let value = response(r#"{"jsonrpc":"2.0","id":1,"result":null}"#)
            .into_result()
            .unwrap();
        let receipt: Option<TransactionReceipt> = serde_json::from_value(value).unwrap();
        assert!(receipt.is_none());
    }

    #[test]
    fn test_revert_with_data() {
        let data = Bytes::from(
            Revert {
                reason: "Not unlocked yet".to_string(),
            }
            .abi_encode(),
        );
        let json = format!(
            r#"{{"jsonrpc":"2.0","id":1,"error":{{"code":3,"message":"execution reverted","data":"{}"}}}}"#,
            data
        );
        let err = response(&json).into_result().unwrap_err();
        assert_eq!(err, AppError::Reverted("Not unlocked yet".to_string()));
    }

    #[test]
    fn test_revert_message_only() {
        let err = response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted: Not owner"}}"#,
        )
        .into_result()
        .unwrap_err();
        assert_eq!(err, AppError::Reverted("Not owner".to_string()));

        let err = response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .into_result()
        .unwrap_err();
        assert_eq!(err, AppError::Reverted(REVERT_WITHOUT_REASON.to_string()));
    }

    #[test]
    fn test_plain_rpc_error() {
        let err = response(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"method not found"}}"#,
        )
        .into_result()
        .unwrap_err();
        assert_eq!(
            err,
            AppError::Rpc {
                code: -32601,
                message: "method not found".to_string()
            }
        );
    }

    #[test]
    fn test_receipt_status() {
        let ok: TransactionReceipt = serde_json::from_str(
            r#"{"transactionHash":"0xabc","blockNumber":"0x10","status":"0x1"}"#,
        )
        .unwrap();
        assert!(ok.succeeded());
        assert_eq!(ok.block(), Some(16));

        let failed: TransactionReceipt =
            serde_json::from_str(r#"{"transactionHash":"0xabc","status":"0x0"}"#).unwrap();
        assert!(!failed.succeeded());
    }

    #[test]
    fn test_call_object() {
        let to = address!("6Dcbd404e62151Bea13e3670b231F5846AB1dA97");
        let from = address!("00000000000000000000000000000000000000aa");

        let obj = call_object(Some(from), to, &[0x2e, 0x1a, 0x7d, 0x4d]);
        assert_eq!(obj["data"], "0x2e1a7d4d");
        assert_eq!(obj["to"], to.to_string());
        assert_eq!(obj["from"], from.to_string());

        assert!(call_object(None, to, &[]).get("from").is_none());
    }

    #[test]
    fn test_parse_quantity() {
        assert_eq!(parse_quantity("0x0").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0x").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0x3b9aca00").unwrap(), U256::from(1_000_000_000u64));
        assert!(parse_quantity("0xzz").is_err());
    }
}
