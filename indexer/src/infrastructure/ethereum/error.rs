use thiserror::Error;

/// Represents errors that can occur talking to the Ethereum node
#[derive(Debug, Clone, Error)]
pub enum ChainClientError {
    /// Transport failure (connection refused, timeout, non-JSON body)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// JSON-RPC error object returned by the node
    #[error("RPC error {code}: {message}")]
    RpcError { code: i64, message: String },
    /// Response did not have the expected shape
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}
