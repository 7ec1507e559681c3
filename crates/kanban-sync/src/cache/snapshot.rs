//! Snapshots for exact rollback.

use std::sync::Arc;

use kanban_core::CacheKey;
use serde_json::Value;
use tracing::debug;

use super::query_cache::QueryCache;

/// Payloads of a set of keys captured at one instant.
///
/// A key that had no data when captured is recorded as `None`; restoring
/// it evicts whatever was written since. A snapshot belongs to the cache
/// epoch it was taken in and is void once the cache is cleared.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSnapshot {
    epoch: u64,
    entries: Vec<(CacheKey, Option<Arc<Value>>)>,
}

impl CacheSnapshot {
    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Captured payload of `key`; `Some(None)` if it was absent.
    pub fn get(&self, key: &CacheKey) -> Option<Option<&Value>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl QueryCache {
    /// Captures the payloads of `keys`.
    pub fn snapshot<'a, I>(&self, keys: I) -> CacheSnapshot
    where
        I: IntoIterator<Item = &'a CacheKey>,
    {
        let epoch = self.epoch();
        let mut entries: Vec<(CacheKey, Option<Arc<Value>>)> = Vec::new();
        for key in keys {
            if entries.iter().any(|(k, _)| k == key) {
                continue;
            }
            entries.push((key.clone(), self.data(key)));
        }
        CacheSnapshot { epoch, entries }
    }

    /// Puts every captured key back to its captured payload, fresh.
    ///
    /// Does nothing and returns false if the cache was cleared after the
    /// snapshot was taken.
    pub fn restore(&self, snapshot: &CacheSnapshot) -> bool {
        match self.apply_changes(snapshot.epoch, snapshot.entries.clone()) {
            Some(count) => {
                debug!(keys = snapshot.len(), changed = count, "Snapshot restored");
                true
            },
            None => {
                debug!(keys = snapshot.len(), "Snapshot dropped, cache cleared since capture");
                false
            },
        }
    }
}
