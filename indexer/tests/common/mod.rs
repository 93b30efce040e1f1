//! In-memory implementations of the reconciler's collaborators
#![allow(dead_code)]

use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ledup_indexer::application::reconciler::{Reconciler, RunSettings, StreamPorts};
use ledup_indexer::config::{ContractKind, StreamConfig};
use ledup_indexer::domain::errors::DecodeError;
use ledup_indexer::domain::models::{
    ArgValue, BlockCheckpoint, BlockTag, DecodedEvent, DecodedLog, EventKeying, RawLog, StreamKey,
};
use ledup_indexer::domain::ports::{CheckpointStore, ChainLogSource, EventStore, StreamLease};
use ledup_indexer::infrastructure::ethereum::ChainClientError;
use ledup_indexer::infrastructure::persistence::DbError;

pub const STREAM: &str = "LedUpBlockchain";
pub const HOLDER: &str = "test-worker";

/// Topic the mock chain knows how to decode
pub fn producer_added_topic() -> B256 {
    B256::repeat_byte(0x01)
}

/// Topic absent from the mock ABI
pub fn unknown_topic() -> B256 {
    B256::repeat_byte(0xee)
}

pub fn tx_hash(n: u8) -> B256 {
    B256::with_last_byte(n)
}

pub fn raw_log(block: u64, tx: u8, log_index: u64, topic: B256) -> RawLog {
    RawLog {
        address: contract_address(),
        topics: vec![topic],
        data: Bytes::new(),
        block_number: Some(block),
        block_hash: Some(B256::repeat_byte(0xbb)),
        transaction_hash: Some(tx_hash(tx)),
        transaction_index: Some(0),
        log_index: Some(log_index),
        removed: false,
    }
}

pub fn contract_address() -> Address {
    Address::repeat_byte(0x42)
}

pub fn stream_config() -> StreamConfig {
    StreamConfig {
        name: STREAM.to_string(),
        contract: ContractKind::DataRegistry,
        address: contract_address(),
        abi_path: None,
        start_block: 0,
    }
}

#[derive(Default)]
pub struct MemoryCheckpointStore {
    rows: Mutex<HashMap<StreamKey, BlockCheckpoint>>,
    pub fail_reads: AtomicBool,
    pub writes: AtomicUsize,
}

impl MemoryCheckpointStore {
    pub fn with_block(block_number: u64) -> Self {
        let store = Self::default();
        store
            .rows
            .lock()
            .unwrap()
            .insert(StreamKey::checkpoint(STREAM), BlockCheckpoint::genesis(block_number));
        store
    }

    pub fn get(&self) -> Option<BlockCheckpoint> {
        self.rows.lock().unwrap().get(&StreamKey::checkpoint(STREAM)).cloned()
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn read_checkpoint(&self, key: &StreamKey) -> Result<Option<BlockCheckpoint>, DbError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DbError::ConnectionError("checkpoint table unavailable".into()));
        }
        Ok(self.rows.lock().unwrap().get(key).cloned())
    }

    async fn write_checkpoint(
        &self,
        key: &StreamKey,
        checkpoint: &BlockCheckpoint,
    ) -> Result<(), DbError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        let stale = rows
            .get(key)
            .is_some_and(|stored| stored.block_number > checkpoint.block_number);
        if !stale {
            rows.insert(key.clone(), checkpoint.clone());
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryEventStore {
    /// Rows in first-insert order; upserts replace in place
    rows: Mutex<Vec<DecodedEvent>>,
    pub writes: AtomicUsize,
}

impl MemoryEventStore {
    pub fn events(&self) -> Vec<DecodedEvent> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn write_event(&self, event: &DecodedEvent) -> Result<(), DbError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();
        match rows
            .iter_mut()
            .find(|r| r.partition_key == event.partition_key && r.row_key == event.row_key)
        {
            Some(existing) => *existing = event.clone(),
            None => rows.push(event.clone()),
        }
        Ok(())
    }

    async fn recent_events(
        &self,
        partition_key: &str,
        limit: u64,
    ) -> Result<Vec<DecodedEvent>, DbError> {
        let mut events: Vec<DecodedEvent> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.partition_key == partition_key)
            .cloned()
            .collect();
        events.sort_by(|a, b| (b.block_number, b.log_index).cmp(&(a.block_number, a.log_index)));
        events.truncate(limit as usize);
        Ok(events)
    }
}

/// Chain that serves a fixed set of logs, filtered by the requested range
#[derive(Default)]
pub struct MockChain {
    logs: Mutex<Vec<RawLog>>,
    pub fail_get_logs: AtomicBool,
    /// `get_logs` never completes while set
    pub hang: AtomicBool,
    pub get_logs_calls: AtomicUsize,
    pub ranges: Mutex<Vec<(BlockTag, BlockTag)>>,
    pub head: Mutex<u64>,
}

impl MockChain {
    pub fn with_logs(logs: Vec<RawLog>) -> Self {
        let chain = Self::default();
        chain.push_logs(logs);
        chain
    }

    pub fn push_logs(&self, logs: Vec<RawLog>) {
        self.logs.lock().unwrap().extend(logs);
    }

    pub fn last_range(&self) -> Option<(BlockTag, BlockTag)> {
        self.ranges.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl ChainLogSource for MockChain {
    async fn get_logs(
        &self,
        _address: &Address,
        from: BlockTag,
        to: BlockTag,
    ) -> Result<Vec<RawLog>, ChainClientError> {
        self.get_logs_calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push((from, to));

        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        if self.fail_get_logs.load(Ordering::SeqCst) {
            return Err(ChainClientError::NetworkError("connection refused".into()));
        }

        let from = match from {
            BlockTag::Number(n) => n,
            BlockTag::Earliest => 0,
            BlockTag::Latest => u64::MAX,
        };

        // Yield so concurrent callers can interleave at this await point
        tokio::task::yield_now().await;

        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .filter(|log| log.block_number.unwrap_or_default() >= from)
            .cloned()
            .collect())
    }

    async fn latest_block(&self) -> Result<u64, ChainClientError> {
        Ok(*self.head.lock().unwrap())
    }

    fn decode_log(&self, log: &RawLog) -> Result<DecodedLog, DecodeError> {
        let topic = log.topics.first().ok_or(DecodeError::MissingTopic)?;
        if *topic != producer_added_topic() {
            return Err(DecodeError::UnknownTopic(topic.to_string()));
        }

        Ok(DecodedLog {
            name: "ProducerRecordAdded".to_string(),
            signature: "ProducerRecordAdded(address)".to_string(),
            topic: topic.to_string(),
            args: vec![ArgValue::Address("0xP1".to_string())],
        })
    }
}

/// Single-holder lease table
#[derive(Default)]
pub struct MemoryLease {
    holders: Mutex<HashMap<String, String>>,
    pub acquires: AtomicUsize,
    pub releases: AtomicUsize,
    /// Calls to `try_acquire` after this many are answered as taken over
    pub taken_over_after: Mutex<Option<usize>>,
}

impl MemoryLease {
    pub fn held_by(stream: &str, holder: &str) -> Self {
        let lease = Self::default();
        lease
            .holders
            .lock()
            .unwrap()
            .insert(stream.to_string(), holder.to_string());
        lease
    }

    pub fn holder(&self, stream: &str) -> Option<String> {
        self.holders.lock().unwrap().get(stream).cloned()
    }
}

#[async_trait]
impl StreamLease for MemoryLease {
    async fn try_acquire(&self, stream: &str, holder: &str, _ttl: Duration) -> Result<bool, DbError> {
        let calls = self.acquires.fetch_add(1, Ordering::SeqCst) + 1;
        let mut holders = self.holders.lock().unwrap();
        if matches!(*self.taken_over_after.lock().unwrap(), Some(limit) if calls > limit) {
            holders.insert(stream.to_string(), "other-worker".to_string());
            return Ok(false);
        }
        match holders.get(stream) {
            Some(current) if current != holder => Ok(false),
            _ => {
                holders.insert(stream.to_string(), holder.to_string());
                Ok(true)
            }
        }
    }

    async fn release(&self, stream: &str, holder: &str) -> Result<(), DbError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        let mut holders = self.holders.lock().unwrap();
        if holders.get(stream).map(String::as_str) == Some(holder) {
            holders.remove(stream);
        }
        Ok(())
    }
}

/// All collaborators of one reconciler, kept for assertions
pub struct Harness {
    pub checkpoints: Arc<MemoryCheckpointStore>,
    pub events: Arc<MemoryEventStore>,
    pub chain: Arc<MockChain>,
    pub lease: Arc<MemoryLease>,
    pub keying: EventKeying,
}

impl Harness {
    pub fn new(checkpoints: MemoryCheckpointStore, chain: MockChain) -> Self {
        Self {
            checkpoints: Arc::new(checkpoints),
            events: Arc::new(MemoryEventStore::default()),
            chain: Arc::new(chain),
            lease: Arc::new(MemoryLease::default()),
            keying: EventKeying::TransactionHash,
        }
    }

    pub fn with_lease(mut self, lease: MemoryLease) -> Self {
        self.lease = Arc::new(lease);
        self
    }

    pub fn with_keying(mut self, keying: EventKeying) -> Self {
        self.keying = keying;
        self
    }

    pub fn reconciler(&self) -> Reconciler {
        let ports = StreamPorts {
            checkpoints: self.checkpoints.clone(),
            events: self.events.clone(),
            chain: self.chain.clone(),
            lease: self.lease.clone(),
        };
        let settings = RunSettings {
            keying: self.keying,
            lease_ttl: Duration::from_secs(60),
            holder_id: HOLDER.to_string(),
        };
        Reconciler::new(stream_config(), ports, settings)
    }
}
