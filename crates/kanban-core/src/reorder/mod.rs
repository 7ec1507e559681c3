//! Drag-and-drop reordering of items across ordered containers.
//!
//! Lists on a board are [`OrderedContainer`]s of card ids. Moving a card
//! produces a [`ReorderPatch`] with only the containers that changed; the
//! caller applies it to cache state. Every item lives in exactly one
//! non-virtual container before and after a move.

mod container;
mod engine;

pub use container::{ContainerId, Containers, ItemId, OrderedContainer};
pub use engine::{CardMove, ReorderError, ReorderPatch, reorder, try_reorder};
