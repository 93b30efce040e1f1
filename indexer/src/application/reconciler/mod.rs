//! Chain-to-store event reconciliation.
//!
//! One [`Reconciler`] per stream; the [`Scheduler`] drives them on a timer
//! and the HTTP surface drives them on demand, both through the
//! [`StreamRegistry`].

mod event_reconciler;
mod scheduler;
mod stream_registry;

pub use event_reconciler::{Reconciler, RunSettings, StreamPorts};
pub use scheduler::Scheduler;
pub use stream_registry::StreamRegistry;
