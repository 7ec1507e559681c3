//! Kanban Core - Domain types and pure logic
//!
//! This crate provides the foundational types shared by the remote client
//! and the synchronization layer: structural cache keys, resource models,
//! the backend error-code taxonomy and the drag-and-drop reorder engine.
//!
//! Nothing in here performs I/O.

pub mod error;
pub mod key;
pub mod model;
pub mod reorder;

pub use error::{ErrorClass, ErrorCode};
pub use key::{CacheKey, KeyPattern, KeySegment};
pub use model::{
    ActivityEntry, Board, BoardList, BoardMember, BoardSummary, Card, Dashboard, MemberRole,
    Profile, Team, Visibility,
};
pub use reorder::{
    CardMove, ContainerId, Containers, ItemId, OrderedContainer, ReorderError, ReorderPatch,
    reorder, try_reorder,
};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
