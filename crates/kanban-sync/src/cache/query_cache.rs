//! QueryCache implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use kanban_core::CacheKey;
use parking_lot::{ReentrantMutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use super::entry::{CacheEntry, EntryStatus};
use super::subscription::{CacheEvent, Change, Query, Subscriber, Subscription};
use crate::metrics::SyncMetrics;

pub(crate) struct CacheInner {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    pub(crate) subscribers: RwLock<Vec<Arc<Subscriber>>>,
    next_subscriber: AtomicU64,
    /// Source of entry generations.
    generations: AtomicU64,
    /// Bumped by every `clear`. Snapshots and patches taken under an older
    /// epoch are dropped instead of applied.
    epoch: AtomicU64,
    /// Held across a change and its notifications. Reentrant so callbacks
    /// can read and write the cache.
    dispatch: ReentrantMutex<()>,
    metrics: SyncMetrics,
}

/// Cache de estado derivado del servidor.
///
/// Clones share the same store. All operations are synchronous; the data
/// lock is never held while subscriber callbacks run.
///
/// # Examples
///
/// ```
/// use kanban_core::cache_key;
/// use kanban_sync::QueryCache;
/// use serde_json::json;
///
/// let cache = QueryCache::new();
/// cache.write(cache_key!["board", 1], json!({"title": "Roadmap"}));
///
/// let entry = cache.read(&cache_key!["board", 1]).unwrap();
/// assert!(entry.is_fresh());
/// ```
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::with_metrics(SyncMetrics::new())
    }

    pub fn with_metrics(metrics: SyncMetrics) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: RwLock::new(HashMap::new()),
                subscribers: RwLock::new(Vec::new()),
                next_subscriber: AtomicU64::new(1),
                generations: AtomicU64::new(1),
                epoch: AtomicU64::new(0),
                dispatch: ReentrantMutex::new(()),
                metrics,
            }),
        }
    }

    pub fn metrics(&self) -> &SyncMetrics {
        &self.inner.metrics
    }

    /// Number of times the cache was cleared.
    pub(crate) fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::Acquire)
    }

    pub(crate) fn next_generation(&self) -> u64 {
        self.inner.generations.fetch_add(1, Ordering::Relaxed)
    }

    /// Returns the current entry without side effects.
    pub fn read(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.inner.entries.read().get(key).cloned()
    }

    /// Returns the current payload, if any.
    pub fn data(&self, key: &CacheKey) -> Option<Arc<Value>> {
        self.inner
            .entries
            .read()
            .get(key)
            .and_then(|e| e.data.clone())
    }

    /// Deserializes the current payload.
    pub fn read_as<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, serde_json::Error> {
        self.data(key).map(|v| T::deserialize(v.as_ref())).transpose()
    }

    pub fn status(&self, key: &CacheKey) -> Option<EntryStatus> {
        self.inner.entries.read().get(key).map(|e| e.status)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.inner.entries.read().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.inner.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.read().is_empty()
    }

    /// Returns all keys, sorted.
    pub fn keys(&self) -> Vec<CacheKey> {
        let mut keys: Vec<CacheKey> = self.inner.entries.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Replaces the payload of `key` and marks it fresh.
    pub fn write(&self, key: CacheKey, data: Value) {
        self.write_shared(key, Arc::new(data));
    }

    fn write_shared(&self, key: CacheKey, data: Arc<Value>) {
        self.apply(|entries| vec![put(entries, key, data, self.next_generation())]);
        self.inner.metrics.record_write();
    }

    /// Writes (`Some`) or evicts (`None`) several keys as one change batch.
    ///
    /// Returns `None` without touching anything if the cache was cleared
    /// since `epoch`.
    pub(crate) fn apply_changes(
        &self,
        epoch: u64,
        changes: Vec<(CacheKey, Option<Arc<Value>>)>,
    ) -> Option<usize> {
        let mut current = true;
        let mut written = 0;
        let count = self.apply(|entries| {
            if self.epoch() != epoch {
                current = false;
                return Vec::new();
            }
            changes
                .into_iter()
                .filter_map(|(key, data)| match data {
                    Some(data) => {
                        written += 1;
                        Some(put(entries, key, data, self.next_generation()))
                    },
                    None => evict(entries, &key),
                })
                .collect()
        });

        if !current {
            return None;
        }
        for _ in 0..written {
            self.inner.metrics.record_write();
        }
        Some(count)
    }

    /// Evicts `key`. Returns false if it was absent.
    pub fn remove(&self, key: &CacheKey) -> bool {
        let removed = self.apply(|entries| evict(entries, key).into_iter().collect());
        removed > 0
    }

    /// Evicts every entry, notifying each affected key.
    pub fn clear(&self) -> usize {
        let count = self.apply(|entries| {
            self.inner.epoch.fetch_add(1, Ordering::AcqRel);
            let mut keys: Vec<CacheKey> = entries.drain().map(|(k, _)| k).collect();
            keys.sort();
            keys.into_iter()
                .map(|key| CacheEvent {
                    key,
                    change: Change::Removed,
                    entry: None,
                })
                .collect()
        });
        info!(count = count, "Cache cleared");
        count
    }

    /// Registers `callback` for every change matching `query`.
    pub fn subscribe<F>(&self, query: impl Into<Query>, callback: F) -> Subscription
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        let query = query.into();
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.write().push(Arc::new(Subscriber {
            id,
            query: query.clone(),
            callback: Arc::new(callback),
        }));

        debug!(subscription = id, query = %query, "Subscribed");
        Subscription::new(id, query, Arc::downgrade(&self.inner))
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    /// Marks `key` as fetching, creating the entry if needed.
    ///
    /// Returns the entry generation the fetch result must match, and the
    /// status to restore if the fetch fails.
    pub(crate) fn begin_fetch(&self, key: &CacheKey) -> (u64, Option<EntryStatus>) {
        let mut ticket = (0, None);
        self.apply(|entries| {
            let entry = entries
                .entry(key.clone())
                .or_insert_with(|| CacheEntry::empty(EntryStatus::Stale, self.next_generation()));
            ticket = (entry.generation, Some(entry.status).filter(|_| entry.data.is_some()));
            entry.status = EntryStatus::Fetching;
            vec![event(key, Change::Fetching, entries.get(key))]
        });
        ticket
    }

    /// Stores a fetch result unless the entry changed since `generation`.
    pub(crate) fn complete_fetch(&self, key: &CacheKey, data: Arc<Value>, generation: u64) -> bool {
        let applied = self.apply(|entries| {
            if entries.get(key).map(|e| e.generation) == Some(generation) {
                vec![put(entries, key.clone(), data, self.next_generation())]
            } else {
                Vec::new()
            }
        });

        if applied == 0 {
            debug!(key = %key, "Fetch result discarded, entry changed while fetching");
        }
        applied > 0
    }

    /// Restores the pre-fetch status after a failed fetch.
    pub(crate) fn abort_fetch(&self, key: &CacheKey, generation: u64, previous: Option<EntryStatus>) {
        self.apply(|entries| match entries.get_mut(key) {
            Some(entry) if entry.generation == generation && entry.status == EntryStatus::Fetching => {
                entry.status = previous.unwrap_or(EntryStatus::Stale);
                let change = match entry.status {
                    EntryStatus::Fresh => Change::Written,
                    _ => Change::Invalidated,
                };
                vec![event(key, change, Some(&*entry))]
            },
            _ => Vec::new(),
        });
    }

    /// Runs `change` under the data lock, then delivers the resulting events
    /// before any other change can start. Returns the number of events.
    pub(crate) fn apply<F>(&self, change: F) -> usize
    where
        F: FnOnce(&mut HashMap<CacheKey, CacheEntry>) -> Vec<CacheEvent>,
    {
        let _dispatch = self.inner.dispatch.lock();

        let events = {
            let mut entries = self.inner.entries.write();
            let events = change(&mut entries);
            self.inner.metrics.update_entry_count(entries.len());
            events
        };

        self.notify(&events);
        events.len()
    }

    fn notify(&self, events: &[CacheEvent]) {
        if events.is_empty() {
            return;
        }

        let subscribers: Vec<Arc<Subscriber>> = self.inner.subscribers.read().clone();
        for event in events {
            debug!(key = %event.key, change = ?event.change, "Cache changed");
            for subscriber in subscribers.iter().filter(|s| s.query.matches(&event.key)) {
                (subscriber.callback)(event);
            }
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.len())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

pub(super) fn event(key: &CacheKey, change: Change, entry: Option<&CacheEntry>) -> CacheEvent {
    CacheEvent {
        key: key.clone(),
        change,
        entry: entry.cloned(),
    }
}

fn put(
    entries: &mut HashMap<CacheKey, CacheEntry>,
    key: CacheKey,
    data: Arc<Value>,
    generation: u64,
) -> CacheEvent {
    let entry = entries
        .entry(key.clone())
        .and_modify(|e| {
            e.data = Some(data.clone());
            e.status = EntryStatus::Fresh;
            e.touch(generation);
        })
        .or_insert_with(|| CacheEntry::with_data(data, generation));

    CacheEvent {
        key,
        change: Change::Written,
        entry: Some(entry.clone()),
    }
}

fn evict(entries: &mut HashMap<CacheKey, CacheEntry>, key: &CacheKey) -> Option<CacheEvent> {
    entries.remove(key).map(|_| CacheEvent {
        key: key.clone(),
        change: Change::Removed,
        entry: None,
    })
}
