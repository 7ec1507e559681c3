#![allow(dead_code)]
use kanban_core::{ContainerId, Containers, ItemId, OrderedContainer};

/// Builds containers from `(id, items)` pairs, in the given order.
pub fn containers(lists: &[(u64, &[u64])]) -> Containers {
    lists
        .iter()
        .map(|(id, items)| {
            (
                ContainerId(*id),
                OrderedContainer::new(items.iter().map(|i| ItemId(*i))),
            )
        })
        .collect()
}

/// Returns the raw item ids of one container.
pub fn ids(containers: &Containers, id: u64) -> Vec<u64> {
    containers[&ContainerId(id)]
        .items()
        .iter()
        .map(|i| i.0)
        .collect()
}

/// Counts how many times `item` appears across all non-virtual containers.
pub fn occurrences(containers: &Containers, item: ItemId) -> usize {
    containers
        .values()
        .filter(|c| !c.is_virtual())
        .map(|c| c.items().iter().filter(|i| **i == item).count())
        .sum()
}
