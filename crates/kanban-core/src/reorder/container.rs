use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Identifier of a container (a list/column on a board).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub u64);

/// Identifier of an item (a card).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "list#{}", self.0)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "card#{}", self.0)
    }
}

/// Containers of a board, in display order.
pub type Containers = IndexMap<ContainerId, OrderedContainer>;

/// Secuencia ordenada de items.
///
/// A virtual container groups items for display only (for example a
/// "favorites" pseudo-list); it is never a valid move source or target.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedContainer {
    items: Vec<ItemId>,
    #[serde(default)]
    is_virtual: bool,
}

impl OrderedContainer {
    /// Creates a regular container holding `items` in order.
    pub fn new(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            items: items.into_iter().collect(),
            is_virtual: false,
        }
    }

    /// Creates a display-only container.
    pub fn virtual_container(items: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            items: items.into_iter().collect(),
            is_virtual: true,
        }
    }

    /// Returns the items in order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Returns true for display-only containers.
    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of `item`, if present.
    pub fn position(&self, item: ItemId) -> Option<usize> {
        self.items.iter().position(|i| *i == item)
    }

    pub(crate) fn remove(&mut self, index: usize) -> ItemId {
        self.items.remove(index)
    }

    pub(crate) fn insert(&mut self, index: usize, item: ItemId) {
        self.items.insert(index, item);
    }
}
