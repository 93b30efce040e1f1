use std::collections::BTreeMap;
use std::sync::Arc;

use crate::application::reconciler::{Reconciler, RunSettings, StreamPorts};
use crate::config::AppConfig;
use crate::domain::errors::DecodeError;
use crate::infrastructure::ethereum::{AbiEventDecoder, ContractLogSource, EthRpcClient};
use crate::infrastructure::persistence::Repositories;

/// Reconcilers of all configured streams, by stream name
#[derive(Clone, Default)]
pub struct StreamRegistry {
    reconcilers: BTreeMap<String, Arc<Reconciler>>,
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire one reconciler per configured stream against the shared
    /// repositories and RPC client
    pub fn from_config(
        config: &AppConfig,
        repositories: &Repositories,
        client: &EthRpcClient,
        holder_id: &str,
    ) -> Result<Self, DecodeError> {
        let settings = RunSettings::from_config(&config.indexer, holder_id);
        let checkpoints = Arc::new(repositories.checkpoint.clone());
        let events = Arc::new(repositories.event.clone());
        let lease = Arc::new(repositories.lease.clone());

        let mut registry = Self::new();
        for stream in &config.streams {
            let decoder = AbiEventDecoder::for_stream(stream)?;
            tracing::info!(
                stream = %stream.name,
                contract = %stream.contract,
                address = %stream.address,
                events = decoder.event_names().len(),
                "stream configured"
            );

            let ports = StreamPorts {
                checkpoints: checkpoints.clone(),
                events: events.clone(),
                chain: Arc::new(ContractLogSource::new(client.clone(), decoder)),
                lease: lease.clone(),
            };
            registry.insert(Reconciler::new(stream.clone(), ports, settings.clone()));
        }

        Ok(registry)
    }

    pub fn insert(&mut self, reconciler: Reconciler) {
        self.reconcilers
            .insert(reconciler.name().to_string(), Arc::new(reconciler));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Reconciler>> {
        self.reconcilers.get(name).cloned()
    }

    pub fn reconcilers(&self) -> impl Iterator<Item = &Arc<Reconciler>> {
        self.reconcilers.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.reconcilers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.reconcilers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reconcilers.is_empty()
    }
}
