//! Cache entries.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Freshness of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryStatus {
    /// Data reflects the last known server state.
    Fresh,
    /// Data may be outdated; the next read refetches it.
    Stale,
    /// A fetch for this key is in flight.
    Fetching,
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fresh => "fresh",
            Self::Stale => "stale",
            Self::Fetching => "fetching",
        };
        f.write_str(s)
    }
}

/// Estado cacheado para una key.
///
/// Payloads are immutable once written: a write replaces the `Arc`, it
/// never mutates through it, so cloning an entry is a deep copy in effect.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub(crate) data: Option<Arc<Value>>,
    pub(crate) status: EntryStatus,
    /// Stamp of the last change, drawn from a counter shared by the whole
    /// cache. Never reused, even after the key is evicted and written again.
    pub(crate) generation: u64,
}

impl CacheEntry {
    pub(crate) fn with_data(data: Arc<Value>, generation: u64) -> Self {
        Self {
            data: Some(data),
            status: EntryStatus::Fresh,
            generation,
        }
    }

    pub(crate) fn empty(status: EntryStatus, generation: u64) -> Self {
        Self {
            data: None,
            status,
            generation,
        }
    }

    /// The payload, if one was ever written.
    pub fn data(&self) -> Option<&Value> {
        self.data.as_deref()
    }

    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// True when the entry holds data that does not need a refetch.
    pub fn is_fresh(&self) -> bool {
        self.status == EntryStatus::Fresh && self.data.is_some()
    }

    /// Deserializes the payload.
    pub fn read_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.data().map(|v| T::deserialize(v))
    }

    pub(crate) fn touch(&mut self, generation: u64) {
        self.generation = generation;
    }
}
