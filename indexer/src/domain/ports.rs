//! Collaborators the reconciler depends on.
//!
//! Production implementations live in `infrastructure`; tests substitute
//! in-memory ones.

use alloy_primitives::Address;
use async_trait::async_trait;
use std::time::Duration;

use crate::domain::errors::DecodeError;
use crate::domain::models::{BlockCheckpoint, BlockTag, DecodedEvent, DecodedLog, RawLog, StreamKey};
use crate::infrastructure::ethereum::ChainClientError;
use crate::infrastructure::persistence::error::DbError;

/// Durable storage of one checkpoint row per stream
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// `Ok(None)` when the stream has never been checkpointed
    async fn read_checkpoint(&self, key: &StreamKey) -> Result<Option<BlockCheckpoint>, DbError>;

    /// Replace every field of the row at `key`; a write carrying a lower
    /// block than the stored one leaves the row unchanged
    async fn write_checkpoint(
        &self,
        key: &StreamKey,
        checkpoint: &BlockCheckpoint,
    ) -> Result<(), DbError>;
}

/// Durable storage of decoded events
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Upsert keyed by `(partition_key, row_key)`
    async fn write_event(&self, event: &DecodedEvent) -> Result<(), DbError>;

    /// Most recent events of a partition, newest first
    async fn recent_events(
        &self,
        partition_key: &str,
        limit: u64,
    ) -> Result<Vec<DecodedEvent>, DbError>;
}

/// Ethereum node plus the ABI used to interpret its logs
#[async_trait]
pub trait ChainLogSource: Send + Sync {
    /// Logs emitted by `address` in `[from, to]`, in chain order
    async fn get_logs(
        &self,
        address: &Address,
        from: BlockTag,
        to: BlockTag,
    ) -> Result<Vec<RawLog>, ChainClientError>;

    /// Current chain head, reported for monitoring only
    async fn latest_block(&self) -> Result<u64, ChainClientError>;

    fn decode_log(&self, log: &RawLog) -> Result<DecodedLog, DecodeError>;
}

/// Cross-process mutual exclusion per stream
#[async_trait]
pub trait StreamLease: Send + Sync {
    /// `Ok(false)` when another holder owns an unexpired lease
    async fn try_acquire(&self, stream: &str, holder: &str, ttl: Duration) -> Result<bool, DbError>;

    async fn release(&self, stream: &str, holder: &str) -> Result<(), DbError>;
}
