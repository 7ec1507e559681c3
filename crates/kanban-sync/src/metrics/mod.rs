//! Metrics for the cache and the mutation coordinator.

mod setup;
mod sync;

pub use setup::{init_metrics, register_metrics};
pub use sync::{MutationOutcome, SyncMetrics};
