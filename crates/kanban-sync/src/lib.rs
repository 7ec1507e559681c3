//! Kanban Sync - optimistic client-side synchronization
//!
//! Rendering code reads server-derived state from a [`QueryCache`] and
//! changes it only through the [`MutationCoordinator`], which applies an
//! optimistic patch, calls the backend, then either commits (invalidating
//! the keys that need a refetch) or restores the exact pre-mutation
//! snapshot.
//!
//! [`KanbanApp`] wires everything together for one application run; it is
//! constructed explicitly and handed to UI code, there are no globals.

pub mod app;
pub mod cache;
pub mod config;
pub mod error;
pub mod kanban;
pub mod metrics;
pub mod mutation;
pub mod query;
pub mod session;

mod queue;

pub use app::KanbanApp;
pub use cache::{
    CacheEntry, CacheEvent, CacheSnapshot, Change, EntryStatus, InvalidationResult, Query,
    QueryCache, Subscription,
};
pub use config::{ExclusivityPolicy, SyncConfig};
pub use error::{MutationError, QueryError, SetupError};
pub use mutation::{
    CacheView, CoordinatorBuilder, Mutation, MutationCoordinator, MutationHandle, MutationId,
    MutationState, Patch, PatchOp, PendingMutation, RecoveryAction, Resolution,
};
pub use query::{QueryClient, Resource, ResourceHandle, ResourceState, RetryPolicy};
pub use session::{Session, SessionEvent};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
