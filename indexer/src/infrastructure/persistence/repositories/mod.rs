pub mod checkpoint_repository;
pub mod event_repository;
pub mod lease_repository;

pub use checkpoint_repository::CheckpointRepository;
pub use event_repository::EventRepository;
pub use lease_repository::LeaseRepository;

/// Collection of all repositories
pub struct Repositories {
    /// Repository for stream checkpoints
    pub checkpoint: CheckpointRepository,
    /// Repository for decoded events
    pub event: EventRepository,
    /// Repository for stream leases
    pub lease: LeaseRepository,
}

impl Repositories {
    /// Create a new Repositories instance
    pub fn new(
        checkpoint: CheckpointRepository,
        event: EventRepository,
        lease: LeaseRepository,
    ) -> Self {
        Self {
            checkpoint,
            event,
            lease,
        }
    }
}
