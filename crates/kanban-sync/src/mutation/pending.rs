//! Registry of mutations that have not resolved yet.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use kanban_core::CacheKey;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::cache::CacheSnapshot;

/// Identifier of one mutation invocation. Time-ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationId(Uuid);

impl MutationId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MutationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a mutation is in its pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationState {
    /// Waiting for exclusive keys.
    Queued,
    OptimisticApplied,
    NetworkInFlight,
    Committed,
    RolledBack(String),
}

/// Resolution of a mutation as seen from outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    InFlight,
    Committed,
    RolledBack(String),
}

impl MutationState {
    pub fn resolution(&self) -> Resolution {
        match self {
            Self::Committed => Resolution::Committed,
            Self::RolledBack(reason) => Resolution::RolledBack(reason.clone()),
            _ => Resolution::InFlight,
        }
    }
}

/// Record of an unresolved mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation {
    pub id: MutationId,
    pub name: &'static str,
    /// Affected and exclusive keys.
    pub keys: Vec<CacheKey>,
    /// Payloads captured before the optimistic patch, if one was applied.
    pub snapshot: Option<CacheSnapshot>,
    pub state: MutationState,
}

impl PendingMutation {
    pub(crate) fn queued(id: MutationId, name: &'static str, keys: Vec<CacheKey>) -> Self {
        Self {
            id,
            name,
            keys,
            snapshot: None,
            state: MutationState::Queued,
        }
    }

    pub fn resolution(&self) -> Resolution {
        self.state.resolution()
    }
}

#[derive(Clone, Default)]
pub(crate) struct PendingRegistry {
    records: Arc<Mutex<HashMap<MutationId, PendingMutation>>>,
}

impl PendingRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a record, removed again when the returned guard drops.
    pub(crate) fn track(&self, record: PendingMutation) -> PendingGuard {
        let id = record.id;
        self.records.lock().insert(id, record);
        PendingGuard {
            id,
            registry: self.clone(),
        }
    }

    pub(crate) fn update<F: FnOnce(&mut PendingMutation)>(&self, id: MutationId, f: F) {
        if let Some(record) = self.records.lock().get_mut(&id) {
            f(record);
        }
    }

    pub(crate) fn set_state(&self, id: MutationId, state: MutationState) {
        self.update(id, |record| record.state = state);
    }

    pub(crate) fn get(&self, id: MutationId) -> Option<PendingMutation> {
        self.records.lock().get(&id).cloned()
    }

    /// All records, oldest first.
    pub(crate) fn list(&self) -> Vec<PendingMutation> {
        let mut records: Vec<PendingMutation> = self.records.lock().values().cloned().collect();
        records.sort_by_key(|r| r.id);
        records
    }

    pub(crate) fn touches(&self, key: &CacheKey) -> bool {
        self.records
            .lock()
            .values()
            .any(|r| r.keys.contains(key))
    }
}

pub(crate) struct PendingGuard {
    id: MutationId,
    registry: PendingRegistry,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.registry.records.lock().remove(&self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::cache_key;

    #[test]
    fn test_ids_are_ordered() {
        let a = MutationId::new();
        let b = MutationId::new();
        assert!(a < b);
    }

    #[test]
    fn test_track_and_release() {
        let registry = PendingRegistry::new();
        let id = MutationId::new();

        let guard = registry.track(PendingMutation::queued(
            id,
            "toggle_favorite",
            vec![cache_key!["dashboard"]],
        ));
        assert!(registry.touches(&cache_key!["dashboard"]));
        assert!(!registry.touches(&cache_key!["board", 1]));

        registry.set_state(id, MutationState::NetworkInFlight);
        assert_eq!(registry.get(id).unwrap().resolution(), Resolution::InFlight);

        registry.set_state(id, MutationState::RolledBack("TIMEOUT".into()));
        assert_eq!(
            registry.get(id).unwrap().resolution(),
            Resolution::RolledBack("TIMEOUT".into())
        );

        drop(guard);
        assert!(registry.list().is_empty());
    }

    #[test]
    fn test_list_oldest_first() {
        let registry = PendingRegistry::new();
        let first = MutationId::new();
        let second = MutationId::new();
        let _b = registry.track(PendingMutation::queued(second, "b", vec![]));
        let _a = registry.track(PendingMutation::queued(first, "a", vec![]));

        let names: Vec<&str> = registry.list().iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }
}
