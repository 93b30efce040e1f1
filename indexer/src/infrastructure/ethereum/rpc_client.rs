//! Minimal Ethereum JSON-RPC client

use alloy_primitives::Address;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::ChainConfig;
use crate::domain::models::{BlockTag, RawLog};
use crate::infrastructure::ethereum::error::ChainClientError;

/// JSON-RPC 2.0 client for the calls the reconciler needs
#[derive(Debug, Clone)]
pub struct EthRpcClient {
    endpoint: String,
    client: Client,
    next_id: Arc<AtomicU64>,
}

impl EthRpcClient {
    /// Create a client for the configured endpoint
    pub fn new(config: &ChainConfig) -> Result<Self, ChainClientError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ChainClientError::ConfigError(e.to_string()))?;

        Ok(Self {
            endpoint: config.rpc_url.clone(),
            client,
            next_id: Arc::new(AtomicU64::new(1)),
        })
    }

    /// Make a JSON-RPC call and return its `result` member
    async fn rpc_call(&self, method: &str, params: Value) -> Result<Value, ChainClientError> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": self.next_id.fetch_add(1, Ordering::Relaxed),
            "method": method,
            "params": params
        });

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ChainClientError::NetworkError(e.to_string()))?;

        let response_json: Value = response
            .json()
            .await
            .map_err(|e| ChainClientError::NetworkError(e.to_string()))?;

        parse_rpc_response(response_json)
    }

    /// `eth_getLogs` for one contract over a block range
    pub async fn get_logs(
        &self,
        address: &Address,
        from: BlockTag,
        to: BlockTag,
    ) -> Result<Vec<RawLog>, ChainClientError> {
        let filter = json!([{
            "address": address.to_string(),
            "fromBlock": from.to_rpc_param(),
            "toBlock": to.to_rpc_param(),
        }]);

        let result = self.rpc_call("eth_getLogs", filter).await?;
        serde_json::from_value(result).map_err(|e| ChainClientError::ParseError(e.to_string()))
    }

    /// Current chain head
    pub async fn block_number(&self) -> Result<u64, ChainClientError> {
        let result = self.rpc_call("eth_blockNumber", json!([])).await?;
        let quantity = result
            .as_str()
            .ok_or_else(|| ChainClientError::ParseError("Invalid block number".to_string()))?;

        u64::from_str_radix(quantity.trim_start_matches("0x"), 16)
            .map_err(|e| ChainClientError::ParseError(e.to_string()))
    }
}

fn parse_rpc_response(response: Value) -> Result<Value, ChainClientError> {
    if let Some(error) = response.get("error") {
        return Err(ChainClientError::RpcError {
            code: error.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: error
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string()),
        });
    }

    response
        .get("result")
        .cloned()
        .ok_or_else(|| ChainClientError::ParseError("No result in response".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_result() {
        let value = parse_rpc_response(json!({"jsonrpc": "2.0", "id": 1, "result": "0x10"})).unwrap();
        assert_eq!(value, json!("0x10"));
    }

    #[test]
    fn maps_rpc_error_object() {
        let err = parse_rpc_response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": { "code": -32005, "message": "query returned more than 10000 results" }
        }))
        .unwrap_err();

        match err {
            ChainClientError::RpcError { code, message } => {
                assert_eq!(code, -32005);
                assert!(message.contains("10000"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_result_is_parse_error() {
        let err = parse_rpc_response(json!({"jsonrpc": "2.0", "id": 1})).unwrap_err();
        assert!(matches!(err, ChainClientError::ParseError(_)));
    }
}
