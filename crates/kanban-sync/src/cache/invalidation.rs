//! Cache invalidation by key prefix.

use kanban_core::{CacheKey, KeyPattern};
use tracing::debug;

use super::entry::EntryStatus;
use super::query_cache::{QueryCache, event};
use super::subscription::Change;

/// Resultado de una operación de invalidación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationResult {
    /// Número de entries que pasaron a stale.
    pub count: usize,
    /// Keys invalidadas, en orden.
    pub keys: Vec<CacheKey>,
}

impl QueryCache {
    /// Marks every entry matching `pattern` as stale.
    ///
    /// Entries that are already stale are left alone, so invalidating twice
    /// has the same effect as invalidating once. The data itself is kept
    /// until the next read refetches it.
    ///
    /// # Examples
    ///
    /// ```
    /// use kanban_core::{cache_key, key_pattern};
    /// use kanban_sync::{EntryStatus, QueryCache};
    /// use serde_json::json;
    ///
    /// let cache = QueryCache::new();
    /// cache.write(cache_key!["board", 1], json!({}));
    /// cache.write(cache_key!["board", 2], json!({}));
    ///
    /// let result = cache.invalidate(key_pattern!["board"]);
    /// assert_eq!(result.count, 2);
    /// assert_eq!(cache.status(&cache_key!["board", 1]), Some(EntryStatus::Stale));
    /// ```
    pub fn invalidate(&self, pattern: impl Into<KeyPattern>) -> InvalidationResult {
        let pattern = pattern.into();
        let mut keys = Vec::new();

        self.apply(|entries| {
            let mut matched: Vec<CacheKey> = entries
                .iter()
                .filter(|(key, entry)| pattern.matches(key) && entry.status != EntryStatus::Stale)
                .map(|(key, _)| key.clone())
                .collect();
            matched.sort();

            let mut events = Vec::with_capacity(matched.len());
            for key in &matched {
                if let Some(entry) = entries.get_mut(key) {
                    entry.status = EntryStatus::Stale;
                    entry.touch(self.next_generation());
                    events.push(event(key, Change::Invalidated, Some(&*entry)));
                }
            }
            keys = matched;
            events
        });

        self.metrics().record_invalidations(keys.len());
        debug!(pattern = %pattern, count = keys.len(), "Cache entries invalidated");

        InvalidationResult {
            count: keys.len(),
            keys,
        }
    }

    /// Invalida múltiples patrones a la vez.
    pub fn invalidate_all<I, P>(&self, patterns: I) -> InvalidationResult
    where
        I: IntoIterator<Item = P>,
        P: Into<KeyPattern>,
    {
        let mut total = InvalidationResult {
            count: 0,
            keys: Vec::new(),
        };

        for pattern in patterns {
            let result = self.invalidate(pattern);
            total.count += result.count;
            total.keys.extend(result.keys);
        }

        total
    }
}
