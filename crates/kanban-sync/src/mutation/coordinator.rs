//! MutationCoordinator implementation.

use std::sync::Arc;
use std::time::Instant;

use kanban_core::CacheKey;
use kanban_remote::ResourceClient;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::definition::{CacheView, Mutation, RecoveryAction};
use super::pending::{MutationId, MutationState, PendingMutation, PendingRegistry};
use crate::cache::QueryCache;
use crate::config::ExclusivityPolicy;
use crate::error::MutationError;
use crate::metrics::{MutationOutcome, SyncMetrics};
use crate::queue::{KeyQueue, Ticket};
use crate::session::Session;

struct CoordinatorInner {
    cache: QueryCache,
    client: Arc<dyn ResourceClient>,
    session: Option<Session>,
    policy: ExclusivityPolicy,
    queue: KeyQueue,
    pending: PendingRegistry,
    metrics: SyncMetrics,
}

/// Runs mutations against the backend and reconciles the cache.
///
/// Clones share the same queue and pending registry.
#[derive(Clone)]
pub struct MutationCoordinator {
    inner: Arc<CoordinatorInner>,
}

/// Builder for [`MutationCoordinator`].
pub struct CoordinatorBuilder {
    cache: QueryCache,
    client: Arc<dyn ResourceClient>,
    session: Option<Session>,
    policy: ExclusivityPolicy,
}

impl CoordinatorBuilder {
    /// How concurrent mutations on one exclusive key are handled.
    pub fn policy(mut self, policy: ExclusivityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Session to end when the backend rejects credentials. Without one,
    /// only the cache is cleared.
    pub fn session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    pub fn build(self) -> MutationCoordinator {
        let metrics = self.cache.metrics().clone();
        MutationCoordinator {
            inner: Arc::new(CoordinatorInner {
                cache: self.cache,
                client: self.client,
                session: self.session,
                policy: self.policy,
                queue: KeyQueue::new(),
                pending: PendingRegistry::new(),
                metrics,
            }),
        }
    }
}

/// Handle to a spawned mutation.
///
/// Dropping the handle does not cancel the mutation; it still commits or
/// rolls back.
#[derive(Debug)]
pub struct MutationHandle<T> {
    id: MutationId,
    task: JoinHandle<Result<T, MutationError>>,
}

impl<T> MutationHandle<T> {
    pub fn id(&self) -> MutationId {
        self.id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the resolution.
    pub async fn outcome(self) -> Result<T, MutationError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(MutationError::Aborted(e.to_string())),
        }
    }
}

impl MutationCoordinator {
    pub fn builder(cache: QueryCache, client: Arc<dyn ResourceClient>) -> CoordinatorBuilder {
        CoordinatorBuilder {
            cache,
            client,
            session: None,
            policy: ExclusivityPolicy::default(),
        }
    }

    /// Coordinator with the default policy and no session.
    pub fn new(cache: QueryCache, client: Arc<dyn ResourceClient>) -> Self {
        Self::builder(cache, client).build()
    }

    pub fn policy(&self) -> ExclusivityPolicy {
        self.inner.policy
    }

    pub fn cache(&self) -> &QueryCache {
        &self.inner.cache
    }

    /// Starts `mutation` on the tokio runtime.
    ///
    /// Exclusive keys are claimed before this returns, so mutations on the
    /// same key run in the order `spawn` was called. Under
    /// [`ExclusivityPolicy::Reject`] a held key fails immediately with
    /// [`MutationError::Busy`].
    pub fn spawn<M: Mutation>(
        &self,
        mutation: M,
        input: M::Input,
    ) -> Result<MutationHandle<M::Output>, MutationError> {
        let inner = &self.inner;
        let id = MutationId::new();
        // A mutation issued before a logout must not write into the next session.
        let epoch = inner.cache.epoch();
        let exclusive = mutation.exclusive_keys(&input);

        let ticket = match inner.policy {
            ExclusivityPolicy::Queue => inner.queue.enqueue(&exclusive),
            ExclusivityPolicy::Reject => inner.queue.try_claim(&exclusive).map_err(|key| {
                warn!(mutation = mutation.name(), key = %key, "Mutation rejected, key busy");
                inner.metrics.record_mutation(mutation.name(), MutationOutcome::Rejected);
                MutationError::Busy { key }
            })?,
        };

        let mut keys: Vec<CacheKey> = mutation.affected_keys(&input);
        keys.extend(exclusive);
        keys.sort();
        keys.dedup();

        let record = inner
            .pending
            .track(PendingMutation::queued(id, mutation.name(), keys));
        debug!(mutation = mutation.name(), id = %id, "Mutation queued");

        let inner = inner.clone();
        let task = tokio::spawn(async move {
            let _record = record;
            inner.run(id, epoch, mutation, input, ticket).await
        });

        Ok(MutationHandle { id, task })
    }

    /// Runs `mutation` and waits for its resolution.
    pub async fn mutate<M: Mutation>(
        &self,
        mutation: M,
        input: M::Input,
    ) -> Result<M::Output, MutationError> {
        self.spawn(mutation, input)?.outcome().await
    }

    /// Unresolved mutations, oldest first.
    pub fn pending(&self) -> Vec<PendingMutation> {
        self.inner.pending.list()
    }

    /// True if an unresolved mutation affects or holds `key`.
    pub fn is_pending(&self, key: &CacheKey) -> bool {
        self.inner.pending.touches(key) || self.inner.queue.is_held(key)
    }
}

impl CoordinatorInner {
    #[instrument(skip_all, fields(mutation = mutation.name(), id = %id))]
    async fn run<M: Mutation>(
        &self,
        id: MutationId,
        epoch: u64,
        mutation: M,
        input: M::Input,
        mut ticket: Ticket,
    ) -> Result<M::Output, MutationError> {
        ticket.ready().await;
        debug!(keys = ticket.keys().len(), "Exclusive keys acquired");
        let started = Instant::now();
        let mut retried = false;

        let result = loop {
            let error = match self.attempt(id, epoch, &mutation, &input).await {
                Ok(output) => break Ok(output),
                Err(error) => error,
            };

            if error == MutationError::AuthExpired {
                self.expire_session();
                break Err(error);
            }
            // Only failures the backend reported get a recovery.
            if error.code().is_none() {
                break Err(error);
            }

            match mutation.on_conflict(&error, &input) {
                RecoveryAction::Surface => break Err(error),
                RecoveryAction::ClearSession => {
                    self.expire_session();
                    break Err(error);
                },
                RecoveryAction::RetryAfter(_) if retried => break Err(error),
                RecoveryAction::RetryAfter(request) => {
                    retried = true;
                    info!(endpoint = %request.endpoint(), code = ?error.code(), "Running recovery request");
                    if let Err(e) = self.client.call(&request).await {
                        let e = MutationError::from(e);
                        warn!(error = %e, "Recovery request failed");
                        if e == MutationError::AuthExpired {
                            self.expire_session();
                        }
                        break Err(e);
                    }
                    self.pending.set_state(id, MutationState::Queued);
                },
            }
        };

        self.metrics
            .record_operation_duration("mutation", started.elapsed());
        result
    }

    async fn attempt<M: Mutation>(
        &self,
        id: MutationId,
        epoch: u64,
        mutation: &M,
        input: &M::Input,
    ) -> Result<M::Output, MutationError> {
        let affected = mutation.affected_keys(input);

        // After a clear the cache holds another session's data, if any.
        let patch = if self.cache.epoch() == epoch {
            mutation
                .optimistic_patch(&CacheView::new(&self.cache), input)
                .and_then(|patch| {
                    if let Some(patch) = &patch {
                        patch.check_declared(&affected)?;
                    }
                    Ok(patch)
                })
        } else {
            debug!("Cache cleared since the mutation was issued, optimistic patch skipped");
            Ok(None)
        };
        let patch = match patch {
            Ok(patch) => patch,
            Err(error) => {
                warn!(error = %error, "Mutation rejected before any write");
                self.pending
                    .set_state(id, MutationState::RolledBack(error.to_string()));
                self.metrics
                    .record_mutation(mutation.name(), MutationOutcome::Rejected);
                return Err(error);
            },
        };

        let snapshot = patch.and_then(|patch| {
            let snapshot = self.cache.snapshot(&affected);
            let applied = if snapshot.epoch() == epoch {
                patch.apply(&self.cache, epoch)
            } else {
                None
            };
            match applied {
                Some(changed) => {
                    debug!(keys = affected.len(), changed = changed, "Optimistic patch applied");
                    Some(snapshot)
                },
                None => {
                    debug!("Cache cleared while patching, optimistic patch dropped");
                    None
                },
            }
        });
        if let Some(snapshot) = &snapshot {
            let snapshot = snapshot.clone();
            self.pending.update(id, |record| {
                record.snapshot = Some(snapshot);
                record.state = MutationState::OptimisticApplied;
            });
        }

        self.pending.set_state(id, MutationState::NetworkInFlight);
        let request = mutation.request(input);

        match self.client.call(&request).await {
            Ok(payload) => {
                self.pending.set_state(id, MutationState::Committed);
                let invalidated = self.cache.invalidate_all(mutation.commit_keys(input));
                self.metrics
                    .record_mutation(mutation.name(), MutationOutcome::Committed);
                info!(invalidated = invalidated.count, "Mutation committed");

                let output = mutation.decode(input, payload).and_then(|output| {
                    mutation.on_committed(input, &output)?;
                    Ok(output)
                });
                if let Err(error) = &output {
                    warn!(
                        mutation = mutation.name(),
                        error = %error,
                        "Mutation committed on the backend but failed locally"
                    );
                }
                output
            },
            Err(remote) => {
                let error = MutationError::from(remote);
                let restored = snapshot
                    .as_ref()
                    .is_some_and(|snapshot| self.cache.restore(snapshot));
                self.pending
                    .set_state(id, MutationState::RolledBack(error.to_string()));
                self.metrics
                    .record_mutation(mutation.name(), MutationOutcome::RolledBack);
                warn!(error = %error, restored = restored, "Mutation rolled back");
                Err(error)
            },
        }
    }

    fn expire_session(&self) {
        match &self.session {
            Some(session) => session.expire(),
            None => {
                warn!("Credentials rejected, clearing cache");
                self.cache.clear();
            },
        }
    }
}
