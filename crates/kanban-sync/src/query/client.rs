//! QueryClient: cached, coalesced, retried reads.

use std::sync::Arc;
use std::time::{Duration, Instant};

use kanban_core::{CacheKey, ErrorClass};
use kanban_remote::{RemoteError, RemoteRequest, ResourceClient};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use super::resource::{Resource, ResourceHandle, ResourceState};
use crate::cache::{Query, QueryCache};
use crate::error::QueryError;
use crate::queue::KeyQueue;
use crate::session::Session;

/// Upper bound for a single retry delay.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Retry schedule for reads failing with a transient error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub retries: u32,
    /// Delay before the first retry, doubled for each later one.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            retries: 0,
            backoff: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (zero-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.backoff
            .saturating_mul(1u32 << attempt.min(16))
            .min(MAX_BACKOFF)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(200),
        }
    }
}

struct QueryInner {
    cache: QueryCache,
    client: Arc<dyn ResourceClient>,
    session: Option<Session>,
    retry: RetryPolicy,
    inflight: KeyQueue,
}

/// Reads resources through the [`QueryCache`].
///
/// A fresh entry is returned as is. Otherwise one fetch runs per key at a
/// time; callers arriving while it runs wait and reuse its result.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<QueryInner>,
}

impl QueryClient {
    pub fn new(cache: QueryCache, client: Arc<dyn ResourceClient>) -> Self {
        Self::with_options(cache, client, None, RetryPolicy::default())
    }

    /// `session` is ended when the backend rejects credentials.
    pub fn with_options(
        cache: QueryCache,
        client: Arc<dyn ResourceClient>,
        session: Option<Session>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(QueryInner {
                cache,
                client,
                session,
                retry,
                inflight: KeyQueue::new(),
            }),
        }
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Returns the cached payload if fresh, fetching it otherwise.
    #[instrument(skip_all, fields(key = %resource.key))]
    pub async fn fetch(&self, resource: &Resource) -> Result<Arc<Value>, QueryError> {
        let cache = &self.inner.cache;
        let key = &resource.key;

        if let Some(data) = self.fresh(key) {
            cache.metrics().record_hit();
            return Ok(data);
        }

        let mut turn = self.inner.inflight.enqueue(std::slice::from_ref(key));
        turn.ready().await;

        if let Some(data) = self.fresh(key) {
            debug!("Served by a concurrent fetch");
            cache.metrics().record_hit();
            return Ok(data);
        }
        cache.metrics().record_miss();

        let (generation, previous) = cache.begin_fetch(key);
        let started = Instant::now();
        let result = self.load(&resource.request).await;
        cache
            .metrics()
            .record_operation_duration("fetch", started.elapsed());

        match result {
            Ok(value) => {
                let data = Arc::new(value);
                cache.complete_fetch(key, data.clone(), generation);
                Ok(data)
            },
            Err(e) => {
                cache.abort_fetch(key, generation, previous);
                if e.class() == ErrorClass::AuthExpired {
                    self.expire_session();
                    return Err(QueryError::AuthExpired);
                }
                Err(QueryError::Remote(e))
            },
        }
    }

    /// Fetches and deserializes.
    pub async fn fetch_as<T: DeserializeOwned>(&self, resource: &Resource) -> Result<T, QueryError> {
        let data = self.fetch(resource).await?;
        T::deserialize(data.as_ref()).map_err(|e| QueryError::Decode {
            key: resource.key.clone(),
            reason: e.to_string(),
        })
    }

    /// Marks the resource stale and fetches it again.
    pub async fn refetch(&self, resource: &Resource) -> Result<Arc<Value>, QueryError> {
        self.inner.cache.invalidate(&resource.key);
        self.fetch(resource).await
    }

    /// Subscribes to a resource without fetching it.
    pub fn watch(&self, resource: Resource) -> ResourceHandle {
        let cache = &self.inner.cache;
        let initial = ResourceState::from_entry(cache.read(&resource.key).as_ref());
        let (tx, rx) = watch::channel(initial);

        let subscription = cache.subscribe(Query::Exact(resource.key.clone()), move |event| {
            tx.send_replace(ResourceState::from_entry(event.entry.as_ref()));
        });

        ResourceHandle::new(resource, self.clone(), rx, subscription)
    }

    /// Subscribes to a resource and starts loading it in the background.
    pub fn use_resource(&self, resource: Resource) -> ResourceHandle {
        let handle = self.watch(resource.clone());
        let queries = self.clone();
        tokio::spawn(async move {
            if let Err(e) = queries.fetch(&resource).await {
                warn!(key = %resource.key, error = %e, "Background load failed");
            }
        });
        handle
    }

    fn fresh(&self, key: &CacheKey) -> Option<Arc<Value>> {
        self.inner
            .cache
            .read(key)
            .filter(|entry| entry.is_fresh())
            .and_then(|entry| entry.data)
    }

    async fn load(&self, request: &RemoteRequest) -> Result<Value, RemoteError> {
        let retries = if request.endpoint().method().is_safe() {
            self.inner.retry.retries
        } else {
            0
        };

        let mut attempt = 0;
        loop {
            match self.inner.client.call(request).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < retries => {
                    let delay = self.inner.retry.delay(attempt);
                    warn!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient read failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }

    fn expire_session(&self) {
        match &self.inner.session {
            Some(session) => session.expire(),
            None => {
                self.inner.cache.clear();
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        let policy = RetryPolicy {
            retries: 3,
            backoff: Duration::from_millis(100),
        };
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(200));
        assert_eq!(policy.delay(2), Duration::from_millis(400));
    }

    #[test]
    fn test_retry_delay_is_capped() {
        let policy = RetryPolicy {
            retries: 40,
            backoff: Duration::from_secs(1),
        };
        assert_eq!(policy.delay(30), MAX_BACKOFF);
    }

    #[test]
    fn test_no_retries() {
        assert_eq!(RetryPolicy::none().retries, 0);
        assert_eq!(RetryPolicy::none().delay(3), Duration::ZERO);
    }
}
