//! Query cache: keyed store of server-derived state.
//!
//! Entries are created on first read or write and removed only by explicit
//! eviction ([`QueryCache::remove`], [`QueryCache::clear`]). Subscribers
//! register a [`Query`] and are called synchronously, in application
//! order, on every change to a key the query matches.

mod entry;
mod invalidation;
mod query_cache;
mod snapshot;
mod subscription;

pub use entry::{CacheEntry, EntryStatus};
pub use invalidation::InvalidationResult;
pub use query_cache::QueryCache;
pub use snapshot::CacheSnapshot;
pub use subscription::{CacheEvent, Change, Query, Subscription};
