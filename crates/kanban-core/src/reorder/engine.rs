use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::container::{ContainerId, Containers, ItemId, OrderedContainer};

/// A drag-and-drop move request.
///
/// `to_index` is interpreted against the destination sequence *after* the
/// item has been removed from its source. For a same-container move of
/// `B` in `[A, B, C, D]` to index 3 the result is `[A, C, D, B]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMove {
    pub item: ItemId,
    pub from: ContainerId,
    pub from_index: usize,
    pub to: ContainerId,
    pub to_index: usize,
}

/// Reasons a move cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReorderError {
    /// The source or destination container does not exist.
    #[error("unknown container: {0}")]
    UnknownContainer(ContainerId),

    /// Virtual containers are display groupings, not move endpoints.
    #[error("container {0} is virtual and cannot take part in a move")]
    VirtualContainer(ContainerId),

    /// The item is not at the claimed source position (UI and state desynced).
    #[error("stale move: {item} is not at index {index} of {container}")]
    StaleMove {
        item: ItemId,
        container: ContainerId,
        index: usize,
    },

    /// The destination index is past the end of the destination sequence.
    #[error("index {index} out of range for {container} (len {len})")]
    IndexOutOfRange {
        container: ContainerId,
        index: usize,
        len: usize,
    },
}

impl ReorderError {
    /// Returns true when the caller should refetch rather than retry.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleMove { .. } | Self::UnknownContainer(_))
    }
}

/// Containers touched by a move, with their new contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReorderPatch {
    changed: Vec<(ContainerId, OrderedContainer)>,
}

impl ReorderPatch {
    /// Returns the changed containers (zero, one or two).
    pub fn changed(&self) -> &[(ContainerId, OrderedContainer)] {
        &self.changed
    }

    /// Returns true if the move does not change anything.
    pub fn is_empty(&self) -> bool {
        self.changed.is_empty()
    }

    /// Applies the patch, keeping the containers' display order.
    pub fn apply(&self, containers: &mut Containers) {
        for (id, container) in &self.changed {
            if let Some(slot) = containers.get_mut(id) {
                *slot = container.clone();
            }
        }
    }

    /// Applies the patch to a copy of `containers`.
    pub fn applied_to(&self, containers: &Containers) -> Containers {
        let mut next = containers.clone();
        self.apply(&mut next);
        next
    }
}

/// Validates `mv` against `containers` and computes the minimal patch.
///
/// Fails without side effects when either container is unknown or
/// virtual, when the item is not found at `from_index`, or when
/// `to_index` is out of range.
pub fn try_reorder(containers: &Containers, mv: &CardMove) -> Result<ReorderPatch, ReorderError> {
    let source = containers
        .get(&mv.from)
        .ok_or(ReorderError::UnknownContainer(mv.from))?;
    let target = containers
        .get(&mv.to)
        .ok_or(ReorderError::UnknownContainer(mv.to))?;

    if target.is_virtual() {
        return Err(ReorderError::VirtualContainer(mv.to));
    }
    if source.is_virtual() {
        return Err(ReorderError::VirtualContainer(mv.from));
    }

    if source.items().get(mv.from_index) != Some(&mv.item) {
        return Err(ReorderError::StaleMove {
            item: mv.item,
            container: mv.from,
            index: mv.from_index,
        });
    }

    if mv.from == mv.to {
        // Valid insertion points are counted after removal.
        let len_after_removal = source.len() - 1;
        if mv.to_index > len_after_removal {
            return Err(ReorderError::IndexOutOfRange {
                container: mv.to,
                index: mv.to_index,
                len: len_after_removal,
            });
        }
        if mv.to_index == mv.from_index {
            return Ok(ReorderPatch::default());
        }

        let mut updated = source.clone();
        let item = updated.remove(mv.from_index);
        updated.insert(mv.to_index, item);

        return Ok(ReorderPatch {
            changed: vec![(mv.from, updated)],
        });
    }

    if mv.to_index > target.len() {
        return Err(ReorderError::IndexOutOfRange {
            container: mv.to,
            index: mv.to_index,
            len: target.len(),
        });
    }

    let mut updated_source = source.clone();
    let item = updated_source.remove(mv.from_index);
    let mut updated_target = target.clone();
    updated_target.insert(mv.to_index, item);

    Ok(ReorderPatch {
        changed: vec![(mv.from, updated_source), (mv.to, updated_target)],
    })
}

/// Applies `mv` and returns the new containers.
///
/// An invalid move returns the input unchanged; use [`try_reorder`] to
/// learn why.
pub fn reorder(containers: &Containers, mv: &CardMove) -> Containers {
    match try_reorder(containers, mv) {
        Ok(patch) => patch.applied_to(containers),
        Err(_) => containers.clone(),
    }
}
