use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::config::{IndexerConfig, StreamConfig};
use crate::domain::errors::{DecodeError, ReconcileError};
use crate::domain::models::{
    BlockCheckpoint, BlockTag, DecodedEvent, EventKeying, RawLog, StreamKey,
};
use crate::domain::ports::{CheckpointStore, ChainLogSource, EventStore, StreamLease};
use crate::infrastructure::ethereum::ChainClientError;
use crate::infrastructure::persistence::error::DbError;

/// Collaborators of one stream's reconciler
#[derive(Clone)]
pub struct StreamPorts {
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub events: Arc<dyn EventStore>,
    pub chain: Arc<dyn ChainLogSource>,
    pub lease: Arc<dyn StreamLease>,
}

/// Per-run behaviour shared by all streams of a process
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub keying: EventKeying,
    pub lease_ttl: Duration,
    /// Identifies this process as lease holder
    pub holder_id: String,
}

impl RunSettings {
    pub fn from_config(config: &IndexerConfig, holder_id: impl Into<String>) -> Self {
        Self {
            keying: config.event_row_key,
            lease_ttl: config.lease_ttl(),
            holder_id: holder_id.into(),
        }
    }
}

/// Brings the event store of one stream up to date with the chain
pub struct Reconciler {
    stream: StreamConfig,
    ports: StreamPorts,
    settings: RunSettings,
    run_lock: Mutex<()>,
}

impl Reconciler {
    pub fn new(stream: StreamConfig, ports: StreamPorts, settings: RunSettings) -> Self {
        Self {
            stream,
            ports,
            settings,
            run_lock: Mutex::new(()),
        }
    }

    pub fn stream(&self) -> &StreamConfig {
        &self.stream
    }

    pub fn name(&self) -> &str {
        &self.stream.name
    }

    /// Run one reconciliation pass.
    ///
    /// Returns the last event persisted, or `None` when the chain had nothing
    /// past the checkpoint. Runs of the same stream never overlap: callers in
    /// this process queue on a mutex, other processes are kept out by the
    /// stream lease and get [`ReconcileError::StreamBusy`].
    #[tracing::instrument(skip(self), fields(stream = %self.stream.name))]
    pub async fn reconcile(&self) -> Result<Option<DecodedEvent>, ReconcileError> {
        let _running = self.run_lock.lock().await;

        let Some(mut lease) =
            LeaseGuard::acquire(self.ports.lease.clone(), &self.stream.name, &self.settings).await?
        else {
            warn!("stream lease held by another worker, skipping run");
            return Err(ReconcileError::StreamBusy(self.stream.name.clone()));
        };

        let outcome = self.run(&mut lease).await;
        lease.release().await;
        outcome
    }

    async fn run(&self, lease: &mut LeaseGuard) -> Result<Option<DecodedEvent>, ReconcileError> {
        let key = StreamKey::checkpoint(&self.stream.name);
        let checkpoint = self.load_checkpoint(&key).await;
        let from = checkpoint.next_block();

        let logs = self
            .ports
            .chain
            .get_logs(&self.stream.address, BlockTag::Number(from), BlockTag::Latest)
            .await?;

        if logs.is_empty() {
            debug!(from, "no new logs");
            return Ok(None);
        }

        info!(from, count = logs.len(), "processing logs");

        let mut last_event: Option<DecodedEvent> = None;
        for log in &logs {
            let event = self.decode(log).map_err(|source| {
                error!(
                    transaction_hash = %transaction_hash_of(log),
                    error = %source,
                    "aborting run on undecodable log"
                );
                ReconcileError::Decode {
                    transaction_hash: transaction_hash_of(log),
                    source,
                }
            })?;

            lease.renew_if_due().await?;
            self.ports.events.write_event(&event).await?;
            debug!(
                block = event.block_number,
                event = %event.name,
                row_key = %event.row_key,
                "event recorded"
            );
            last_event = Some(event);
        }

        if let Some(event) = &last_event {
            // Only the current holder may move the checkpoint
            lease.renew().await?;
            let next = BlockCheckpoint::after(event);
            self.ports.checkpoints.write_checkpoint(&key, &next).await?;
            info!(
                block = next.block_number,
                events = logs.len(),
                "checkpoint advanced"
            );
        }

        Ok(last_event)
    }

    /// Unreadable or missing checkpoints start the stream from its start block
    async fn load_checkpoint(&self, key: &StreamKey) -> BlockCheckpoint {
        match self.ports.checkpoints.read_checkpoint(key).await {
            Ok(Some(checkpoint)) => checkpoint,
            Ok(None) => {
                info!(start_block = self.stream.start_block, "no checkpoint recorded yet");
                BlockCheckpoint::genesis(self.stream.start_block)
            }
            Err(e) => {
                warn!(
                    error = %e,
                    start_block = self.stream.start_block,
                    "checkpoint unreadable, starting from start block"
                );
                BlockCheckpoint::genesis(self.stream.start_block)
            }
        }
    }

    fn decode(&self, log: &RawLog) -> Result<DecodedEvent, DecodeError> {
        let decoded = self.ports.chain.decode_log(log)?;
        DecodedEvent::from_log(
            &self.stream.name,
            log,
            decoded,
            self.settings.keying,
            Utc::now(),
        )
    }

    /// Current checkpoint, if any
    pub async fn checkpoint(&self) -> Result<Option<BlockCheckpoint>, DbError> {
        self.ports
            .checkpoints
            .read_checkpoint(&StreamKey::checkpoint(&self.stream.name))
            .await
    }

    /// Most recently recorded events, newest first
    pub async fn recent_events(&self, limit: u64) -> Result<Vec<DecodedEvent>, DbError> {
        self.ports.events.recent_events(&self.stream.name, limit).await
    }

    pub async fn chain_head(&self) -> Result<u64, ChainClientError> {
        self.ports.chain.latest_block().await
    }
}

/// A stream lease held for the length of one run.
///
/// A guard dropped before [`LeaseGuard::release`] completes, as happens when
/// the run's task is aborted or an HTTP client disconnects, hands the lease
/// back from a task spawned on the current runtime.
struct LeaseGuard {
    lease: Arc<dyn StreamLease>,
    stream: String,
    holder: String,
    ttl: Duration,
    renewed_at: Instant,
    released: bool,
}

impl LeaseGuard {
    async fn acquire(
        lease: Arc<dyn StreamLease>,
        stream: &str,
        settings: &RunSettings,
    ) -> Result<Option<Self>, DbError> {
        let acquired = lease
            .try_acquire(stream, &settings.holder_id, settings.lease_ttl)
            .await?;
        Ok(acquired.then(|| Self {
            lease,
            stream: stream.to_string(),
            holder: settings.holder_id.clone(),
            ttl: settings.lease_ttl,
            renewed_at: Instant::now(),
            released: false,
        }))
    }

    /// Extend the lease by a full TTL
    async fn renew(&mut self) -> Result<(), ReconcileError> {
        let held = self
            .lease
            .try_acquire(&self.stream, &self.holder, self.ttl)
            .await?;
        if !held {
            error!(stream = %self.stream, "stream lease taken over mid-run");
            return Err(ReconcileError::LeaseLost(self.stream.clone()));
        }
        self.renewed_at = Instant::now();
        Ok(())
    }

    /// Renew once half the TTL has passed since the last renewal
    async fn renew_if_due(&mut self) -> Result<(), ReconcileError> {
        if self.renewed_at.elapsed() >= self.ttl / 2 {
            self.renew().await?;
        }
        Ok(())
    }

    async fn release(mut self) {
        if let Err(e) = self.lease.release(&self.stream, &self.holder).await {
            warn!(error = %e, "failed to release stream lease");
        }
        self.released = true;
    }
}

impl Drop for LeaseGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!(stream = %self.stream, "run cancelled without a runtime, lease left to expire");
            return;
        };

        warn!(stream = %self.stream, "run cancelled, releasing stream lease");
        let lease = self.lease.clone();
        let stream = std::mem::take(&mut self.stream);
        let holder = std::mem::take(&mut self.holder);
        runtime.spawn(async move {
            if let Err(e) = lease.release(&stream, &holder).await {
                warn!(stream = %stream, error = %e, "failed to release stream lease");
            }
        });
    }
}

fn transaction_hash_of(log: &RawLog) -> String {
    log.transaction_hash
        .map(|hash| hash.to_string())
        .unwrap_or_else(|| "<pending>".to_string())
}
