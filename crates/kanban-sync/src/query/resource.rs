//! Resource descriptors and live handles.

use std::sync::Arc;

use kanban_core::CacheKey;
use kanban_remote::RemoteRequest;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use super::client::QueryClient;
use crate::cache::{CacheEntry, EntryStatus, Subscription};
use crate::error::QueryError;

/// A cache key and the request that loads it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub key: CacheKey,
    pub request: RemoteRequest,
}

impl Resource {
    pub fn new(key: CacheKey, request: impl Into<RemoteRequest>) -> Self {
        Self {
            key,
            request: request.into(),
        }
    }
}

/// Snapshot of one resource as seen by UI code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResourceState {
    pub data: Option<Arc<Value>>,
    /// `None` while no entry exists.
    pub status: Option<EntryStatus>,
}

impl ResourceState {
    pub(crate) fn from_entry(entry: Option<&CacheEntry>) -> Self {
        match entry {
            Some(entry) => Self {
                data: entry.data.clone(),
                status: Some(entry.status()),
            },
            None => Self::default(),
        }
    }

    /// First load still running.
    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.status == Some(EntryStatus::Fetching)
    }

    pub fn is_stale(&self) -> bool {
        self.status == Some(EntryStatus::Stale)
    }

    pub fn read_as<T: DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.data.as_deref().map(|v| T::deserialize(v))
    }
}

/// Live view of one resource.
///
/// Holds a cache subscription for as long as it exists; the current state
/// is always available and changes can be awaited.
pub struct ResourceHandle {
    resource: Resource,
    queries: QueryClient,
    state: watch::Receiver<ResourceState>,
    _subscription: Subscription,
}

impl ResourceHandle {
    pub(crate) fn new(
        resource: Resource,
        queries: QueryClient,
        state: watch::Receiver<ResourceState>,
        subscription: Subscription,
    ) -> Self {
        Self {
            resource,
            queries,
            state,
            _subscription: subscription,
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.resource.key
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }

    /// Current state.
    pub fn state(&self) -> ResourceState {
        self.state.borrow().clone()
    }

    /// Waits for the next change. `None` once the cache is gone.
    pub async fn changed(&mut self) -> Option<ResourceState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    /// Returns the payload, refetching first if the entry is not fresh.
    pub async fn load(&self) -> Result<Arc<Value>, QueryError> {
        self.queries.fetch(&self.resource).await
    }

    pub async fn load_as<T: DeserializeOwned>(&self) -> Result<T, QueryError> {
        self.queries.fetch_as(&self.resource).await
    }
}

impl std::fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("key", &self.resource.key)
            .field("state", &*self.state.borrow())
            .finish()
    }
}
