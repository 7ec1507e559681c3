//! Optimistic patches.

use std::sync::Arc;

use kanban_core::CacheKey;
use serde_json::Value;

use crate::cache::QueryCache;
use crate::error::MutationError;

/// One change to one key.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    Set(Value),
    Remove,
}

/// Ordered list of key changes applied as one batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Patch {
    ops: Vec<(CacheKey, PatchOp)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: CacheKey, value: Value) -> Self {
        self.ops.push((key, PatchOp::Set(value)));
        self
    }

    pub fn remove(mut self, key: CacheKey) -> Self {
        self.ops.push((key, PatchOp::Remove));
        self
    }

    pub fn ops(&self) -> &[(CacheKey, PatchOp)] {
        &self.ops
    }

    pub fn keys(&self) -> impl Iterator<Item = &CacheKey> {
        self.ops.iter().map(|(k, _)| k)
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Fails on the first key not listed in `declared`.
    pub(crate) fn check_declared(&self, declared: &[CacheKey]) -> Result<(), MutationError> {
        match self.keys().find(|key| !declared.contains(key)) {
            Some(key) => Err(MutationError::UndeclaredKey { key: key.clone() }),
            None => Ok(()),
        }
    }

    /// Applies every op, or nothing if the cache was cleared since `epoch`.
    pub(crate) fn apply(self, cache: &QueryCache, epoch: u64) -> Option<usize> {
        let changes = self
            .ops
            .into_iter()
            .map(|(key, op)| match op {
                PatchOp::Set(value) => (key, Some(Arc::new(value))),
                PatchOp::Remove => (key, None),
            })
            .collect();
        cache.apply_changes(epoch, changes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::cache_key;
    use serde_json::json;

    #[test]
    fn test_check_declared() {
        let patch = Patch::new()
            .set(cache_key!["board", 1], json!({}))
            .remove(cache_key!["dashboard"]);

        assert!(patch
            .check_declared(&[cache_key!["dashboard"], cache_key!["board", 1]])
            .is_ok());
        assert_eq!(
            patch.check_declared(&[cache_key!["board", 1]]),
            Err(MutationError::UndeclaredKey {
                key: cache_key!["dashboard"]
            })
        );
    }

    #[test]
    fn test_apply() {
        let cache = QueryCache::new();
        cache.write(cache_key!["dashboard"], json!([1]));

        let changed = Patch::new()
            .set(cache_key!["board", 1], json!("new"))
            .remove(cache_key!["dashboard"])
            .remove(cache_key!["team"])
            .apply(&cache, cache.epoch());

        assert_eq!(changed, Some(2));
        assert_eq!(cache.data(&cache_key!["board", 1]).as_deref(), Some(&json!("new")));
        assert!(!cache.contains(&cache_key!["dashboard"]));
    }

    #[test]
    fn test_apply_after_clear_writes_nothing() {
        let cache = QueryCache::new();
        let epoch = cache.epoch();
        cache.clear();

        let changed = Patch::new()
            .set(cache_key!["board", 1], json!("stale session"))
            .apply(&cache, epoch);

        assert_eq!(changed, None);
        assert!(cache.is_empty());
    }
}
