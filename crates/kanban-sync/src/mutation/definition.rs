//! The `Mutation` trait.

use std::sync::Arc;

use kanban_core::{CacheKey, KeyPattern};
use kanban_remote::RemoteRequest;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::patch::Patch;
use crate::cache::QueryCache;
use crate::error::MutationError;

/// Read-only view of the cache handed to optimistic patch functions.
pub struct CacheView<'a> {
    cache: &'a QueryCache,
}

impl<'a> CacheView<'a> {
    pub fn new(cache: &'a QueryCache) -> Self {
        Self { cache }
    }

    pub fn data(&self, key: &CacheKey) -> Option<Arc<Value>> {
        self.cache.data(key)
    }

    pub fn read_as<T: DeserializeOwned>(&self, key: &CacheKey) -> Result<Option<T>, serde_json::Error> {
        self.cache.read_as(key)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.cache.contains(key)
    }
}

/// What to do after a server-reported failure, once rollback is done.
#[derive(Debug, Clone, PartialEq)]
pub enum RecoveryAction {
    /// Hand the error to the caller.
    Surface,
    /// Issue this request, then run the whole mutation again. At most once
    /// per invocation.
    RetryAfter(RemoteRequest),
    /// End the session as if credentials had expired.
    ClearSession,
}

/// A state change against the backend with optional optimistic effect.
///
/// Implementors are plain descriptions; the
/// [`MutationCoordinator`](super::MutationCoordinator) owns sequencing,
/// snapshots and reconciliation.
pub trait Mutation: Send + Sync + 'static {
    type Input: Send + Sync + 'static;
    type Output: Send + 'static;

    /// Name used in logs and metrics.
    fn name(&self) -> &'static str;

    /// Keys the optimistic patch may write. These are snapshotted.
    fn affected_keys(&self, input: &Self::Input) -> Vec<CacheKey>;

    /// Keys on which no other mutation may be in flight concurrently.
    fn exclusive_keys(&self, input: &Self::Input) -> Vec<CacheKey> {
        self.affected_keys(input)
    }

    /// Computes the tentative cache change from the current cache state.
    ///
    /// Runs after the exclusive keys are claimed. An error rejects the
    /// mutation before anything is written or sent.
    fn optimistic_patch(
        &self,
        _view: &CacheView<'_>,
        _input: &Self::Input,
    ) -> Result<Option<Patch>, MutationError> {
        Ok(None)
    }

    /// The backend call.
    fn request(&self, input: &Self::Input) -> RemoteRequest;

    /// Patterns to invalidate after the backend accepted the request.
    fn commit_keys(&self, input: &Self::Input) -> Vec<KeyPattern>;

    /// Turns the response payload into the output.
    fn decode(&self, input: &Self::Input, payload: Value) -> Result<Self::Output, MutationError>;

    /// Runs after a successful commit and decode.
    fn on_committed(&self, _input: &Self::Input, _output: &Self::Output) -> Result<(), MutationError> {
        Ok(())
    }

    /// Picks the recovery for a server-reported failure.
    fn on_conflict(&self, _error: &MutationError, _input: &Self::Input) -> RecoveryAction {
        RecoveryAction::Surface
    }
}

/// Decodes a payload into `T`, mapping failures to [`MutationError::Decode`].
pub(crate) fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T, MutationError> {
    serde_json::from_value(payload).map_err(|e| MutationError::Decode(e.to_string()))
}
