//! Application wiring.

use std::sync::Arc;

use kanban_remote::{
    CredentialStore, CredentialVault, Endpoint, FileCredentialStore, HttpResourceClient,
    MemoryCredentialStore, RemoteRequest, ResourceClient,
};
use tracing::{info, warn};

use crate::cache::QueryCache;
use crate::config::SyncConfig;
use crate::error::{MutationError, SetupError};
use crate::kanban::{Login, LoginInput};
use crate::metrics::SyncMetrics;
use crate::mutation::{Mutation, MutationCoordinator, MutationHandle};
use crate::query::{QueryClient, Resource, ResourceHandle};
use crate::session::Session;

/// Everything one application run needs, built once and handed to the UI.
///
/// Cheap to clone; clones share the cache, queues and session.
#[derive(Clone)]
pub struct KanbanApp {
    cache: QueryCache,
    client: Arc<dyn ResourceClient>,
    queries: QueryClient,
    coordinator: MutationCoordinator,
    session: Session,
}

impl KanbanApp {
    /// Wires the components around an existing transport.
    pub fn new(client: Arc<dyn ResourceClient>, vault: CredentialVault, config: &SyncConfig) -> Self {
        let cache = QueryCache::with_metrics(SyncMetrics::new());
        let session = Session::new(vault, cache.clone());
        let queries = QueryClient::with_options(
            cache.clone(),
            client.clone(),
            Some(session.clone()),
            config.retry_policy(),
        );
        let coordinator = MutationCoordinator::builder(cache.clone(), client.clone())
            .policy(config.exclusivity)
            .session(session.clone())
            .build();

        Self {
            cache,
            client,
            queries,
            coordinator,
            session,
        }
    }

    /// Builds the HTTP transport and credential vault described by `config`.
    pub fn from_config(config: &SyncConfig) -> Result<Self, SetupError> {
        let persistent: Arc<dyn CredentialStore> = match &config.credentials_dir {
            Some(dir) => Arc::new(FileCredentialStore::in_dir(dir)),
            None => Arc::new(MemoryCredentialStore::new()),
        };
        let vault = CredentialVault::new(Arc::new(MemoryCredentialStore::new()), persistent);
        // Surface unreadable stored credentials at startup rather than on the first request.
        vault.current()?;

        let client = HttpResourceClient::new(config.client_config()?, vault.clone())?;
        info!(base_url = %config.base_url, exclusivity = ?config.exclusivity, "Kanban client ready");

        Ok(Self::new(Arc::new(client), vault, config))
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn queries(&self) -> &QueryClient {
        &self.queries
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn metrics(&self) -> &SyncMetrics {
        self.cache.metrics()
    }

    /// Watches `resource`, loading it in the background if needed.
    pub fn use_resource(&self, resource: Resource) -> ResourceHandle {
        self.queries.use_resource(resource)
    }

    /// Spawns `mutation`; see [`MutationCoordinator::spawn`].
    pub fn mutate<M: Mutation>(
        &self,
        mutation: M,
        input: M::Input,
    ) -> Result<MutationHandle<M::Output>, MutationError> {
        self.coordinator.spawn(mutation, input)
    }

    /// Signs in and stores the credentials in the tier `input` asks for.
    pub async fn login(&self, input: LoginInput) -> Result<(), MutationError> {
        self.coordinator
            .mutate(Login::new(self.session.clone()), input)
            .await
            .map(|_| ())
    }

    /// Ends the session. The backend is told on a best-effort basis; local
    /// state is cleared whatever it answers.
    pub async fn logout(&self) {
        if let Err(e) = self.client.call(&RemoteRequest::new(Endpoint::Logout)).await {
            warn!(error = %e, "Logout request failed, clearing local session anyway");
        }
        self.session.sign_out();
    }
}

impl std::fmt::Debug for KanbanApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KanbanApp")
            .field("client", &self.client.name())
            .field("cache", &self.cache)
            .field("session", &self.session)
            .finish()
    }
}
