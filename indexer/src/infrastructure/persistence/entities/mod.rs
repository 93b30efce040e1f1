pub mod block_checkpoints;
pub mod decoded_events;
pub mod stream_leases;
