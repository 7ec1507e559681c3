//! Optimistic mutation coordinator.
//!
//! A mutation runs as: claim exclusive keys, compute and apply the
//! optimistic patch (after snapshotting every affected key), issue the
//! request, then either commit (invalidate `commit_keys`) or restore the
//! snapshot. Rollback is exact: every affected key ends up with the
//! payload it had before the patch.

mod coordinator;
mod definition;
mod patch;
mod pending;

pub use coordinator::{CoordinatorBuilder, MutationCoordinator, MutationHandle};
pub use definition::{CacheView, Mutation, RecoveryAction};
pub use patch::{Patch, PatchOp};
pub use pending::{MutationId, MutationState, PendingMutation, Resolution};
pub(crate) use definition::decode_payload;
