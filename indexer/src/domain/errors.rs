use thiserror::Error;

use crate::infrastructure::ethereum::ChainClientError;
use crate::infrastructure::persistence::error::DbError;

/// Failure to turn a raw log into a [`DecodedEvent`](super::models::DecodedEvent)
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("log has no topics")]
    MissingTopic,
    #[error("topic {0} does not match any event in the contract ABI")]
    UnknownTopic(String),
    #[error("failed to decode {event} arguments: {reason}")]
    InvalidArguments { event: String, reason: String },
    #[error("log is missing {0}")]
    IncompleteLog(&'static str),
    #[error("invalid contract ABI: {0}")]
    InvalidAbi(String),
}

/// Error type for a reconciliation run
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Chain log source error: {0}")]
    Chain(#[from] ChainClientError),
    #[error("Failed to decode log in transaction {transaction_hash}: {source}")]
    Decode {
        transaction_hash: String,
        #[source]
        source: DecodeError,
    },
    #[error("Storage error: {0}")]
    Storage(#[from] DbError),
    #[error("Stream {0} is being reconciled by another worker")]
    StreamBusy(String),
    #[error("Stream {0} lease was taken over by another worker during the run")]
    LeaseLost(String),
}
