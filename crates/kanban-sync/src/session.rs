//! Session lifecycle: sign-in, sign-out and global expiry.

use kanban_remote::{CredentialError, CredentialVault, Credentials, StorageTier};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::cache::QueryCache;

/// Session transitions broadcast to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { tier: StorageTier },
    /// The user logged out.
    SignedOut,
    /// The backend rejected the credentials; the UI should route to sign-in.
    Expired,
}

/// Credentials plus the cache they authorize.
///
/// Ending a session, by logout or expiry, clears both credential tiers and
/// every cache entry.
#[derive(Clone)]
pub struct Session {
    vault: CredentialVault,
    cache: QueryCache,
    events: broadcast::Sender<SessionEvent>,
}

impl Session {
    pub fn new(vault: CredentialVault, cache: QueryCache) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            vault,
            cache,
            events,
        }
    }

    pub fn vault(&self) -> &CredentialVault {
        &self.vault
    }

    /// Receives every transition from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_signed_in(&self) -> bool {
        self.vault.access_token().is_some()
    }

    /// Stores freshly issued credentials in the tier `keep_signed_in` picks.
    pub fn sign_in(
        &self,
        credentials: &Credentials,
        keep_signed_in: bool,
    ) -> Result<StorageTier, CredentialError> {
        self.vault.save(credentials, keep_signed_in)?;
        let tier = if keep_signed_in {
            StorageTier::Persistent
        } else {
            StorageTier::Session
        };

        info!(tier = ?tier, "Signed in");
        self.broadcast(SessionEvent::SignedIn { tier });
        Ok(tier)
    }

    /// Ends the session at the user's request.
    pub fn sign_out(&self) {
        self.end();
        info!("Signed out");
        self.broadcast(SessionEvent::SignedOut);
    }

    /// Ends the session after the backend rejected its credentials.
    pub fn expire(&self) {
        self.end();
        warn!("Session expired, local state cleared");
        self.broadcast(SessionEvent::Expired);
    }

    fn end(&self) {
        if let Err(e) = self.vault.clear() {
            warn!(error = %e, "Failed to clear stored credentials");
        }
        self.cache.clear();
    }

    fn broadcast(&self, event: SessionEvent) {
        // No receivers is fine; nobody is listening yet.
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}
