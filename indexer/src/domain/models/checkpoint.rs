use serde::{Deserialize, Serialize};

use super::DecodedEvent;

/// Row key under which every stream keeps its single checkpoint row
pub const CHECKPOINT_ROW_KEY: &str = "LastProcessedBlock";

/// Composite identity of a durable row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamKey {
    pub partition_key: String,
    pub row_key: String,
}

impl StreamKey {
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
        }
    }

    /// Key of the checkpoint row for `stream`
    pub fn checkpoint(stream: &str) -> Self {
        Self::new(stream, CHECKPOINT_ROW_KEY)
    }
}

/// Last block whose events have been fully recorded for a stream.
///
/// Overwritten at the end of each run that persisted at least one event,
/// carrying a copy of that run's last event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockCheckpoint {
    pub block_number: u64,
    pub last_event: Option<DecodedEvent>,
}

impl BlockCheckpoint {
    /// Checkpoint of a stream that has never been reconciled
    pub fn genesis(block_number: u64) -> Self {
        Self {
            block_number,
            last_event: None,
        }
    }

    /// Checkpoint confirming everything up to and including `event`
    pub fn after(event: &DecodedEvent) -> Self {
        Self {
            block_number: event.block_number,
            last_event: Some(event.clone()),
        }
    }

    /// First block a run resumes from
    pub fn next_block(&self) -> u64 {
        self.block_number.saturating_add(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoint_key_uses_fixed_row() {
        let key = StreamKey::checkpoint("LedUpBlockchain");
        assert_eq!(key.partition_key, "LedUpBlockchain");
        assert_eq!(key.row_key, "LastProcessedBlock");
    }

    #[test]
    fn resumes_after_recorded_block() {
        assert_eq!(BlockCheckpoint::genesis(0).next_block(), 1);
        assert_eq!(BlockCheckpoint::genesis(u64::MAX).next_block(), u64::MAX);
    }
}
