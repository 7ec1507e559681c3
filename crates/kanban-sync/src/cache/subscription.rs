//! Subscriptions and change events.

use std::fmt;
use std::sync::{Arc, Weak};

use kanban_core::{CacheKey, KeyPattern};

use super::entry::CacheEntry;
use super::query_cache::CacheInner;

/// What a subscriber listens to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Query {
    /// Changes to exactly this key.
    Exact(CacheKey),
    /// Changes to every key the pattern prefixes.
    Prefix(KeyPattern),
}

impl Query {
    pub fn matches(&self, key: &CacheKey) -> bool {
        match self {
            Self::Exact(exact) => exact == key,
            Self::Prefix(pattern) => pattern.matches(key),
        }
    }
}

impl From<CacheKey> for Query {
    fn from(key: CacheKey) -> Self {
        Self::Exact(key)
    }
}

impl From<KeyPattern> for Query {
    fn from(pattern: KeyPattern) -> Self {
        Self::Prefix(pattern)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(key) => write!(f, "{}", key),
            Self::Prefix(pattern) => write!(f, "{}", pattern),
        }
    }
}

/// Kind of change delivered to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Written,
    Invalidated,
    Fetching,
    Removed,
}

/// Notification delivered to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEvent {
    pub key: CacheKey,
    pub change: Change,
    /// Entry state right after the change; `None` once removed.
    pub entry: Option<CacheEntry>,
}

pub(crate) type Callback = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

pub(crate) struct Subscriber {
    pub(crate) id: u64,
    pub(crate) query: Query,
    pub(crate) callback: Callback,
}

/// RAII guard for a subscription; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    query: Query,
    cache: Weak<CacheInner>,
}

impl Subscription {
    pub(crate) fn new(id: u64, query: Query, cache: Weak<CacheInner>) -> Self {
        Self { id, query, cache }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Removes the callback now.
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.upgrade() {
            cache.subscribers.write().retain(|s| s.id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("query", &self.query)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::{cache_key, key_pattern};

    #[test]
    fn test_exact_query() {
        let query = Query::from(cache_key!["board", 1]);
        assert!(query.matches(&cache_key!["board", 1]));
        assert!(!query.matches(&cache_key!["board", 1, "members"]));
        assert!(!query.matches(&cache_key!["board", 2]));
    }

    #[test]
    fn test_prefix_query() {
        let query = Query::from(key_pattern!["board"]);
        assert!(query.matches(&cache_key!["board", 1]));
        assert!(query.matches(&cache_key!["board", 1, "members"]));
        assert!(!query.matches(&cache_key!["dashboard"]));
    }
}
