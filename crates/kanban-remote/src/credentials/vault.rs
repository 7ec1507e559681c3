use std::sync::Arc;

use tracing::{info, warn};

use super::{CredentialStore, Credentials, MemoryCredentialStore, StorageTier};
use crate::error::CredentialError;

/// Selects between the session and persistent credential tiers.
#[derive(Clone)]
pub struct CredentialVault {
    session: Arc<dyn CredentialStore>,
    persistent: Arc<dyn CredentialStore>,
}

impl CredentialVault {
    pub fn new(session: Arc<dyn CredentialStore>, persistent: Arc<dyn CredentialStore>) -> Self {
        Self {
            session,
            persistent,
        }
    }

    /// Vault with both tiers in memory (tests, ephemeral CLI runs).
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(MemoryCredentialStore::new()),
        )
    }

    /// Saves credentials in the tier chosen by `keep_signed_in` and clears
    /// the other tier, so only one copy exists at a time.
    pub fn save(&self, credentials: &Credentials, keep_signed_in: bool) -> Result<(), CredentialError> {
        let (target, other) = if keep_signed_in {
            (&self.persistent, &self.session)
        } else {
            (&self.session, &self.persistent)
        };

        other.clear()?;
        target.store(credentials)?;

        info!(tier = ?target.tier(), "Credentials saved");
        Ok(())
    }

    /// Returns the current credentials, session tier first.
    pub fn current(&self) -> Result<Option<Credentials>, CredentialError> {
        if let Some(credentials) = self.session.load()? {
            return Ok(Some(credentials));
        }
        self.persistent.load()
    }

    /// Returns the tier currently holding credentials.
    pub fn active_tier(&self) -> Result<Option<StorageTier>, CredentialError> {
        if self.session.load()?.is_some() {
            return Ok(Some(StorageTier::Session));
        }
        Ok(self.persistent.load()?.map(|_| StorageTier::Persistent))
    }

    /// Returns the access token to attach to requests.
    ///
    /// Storage failures are logged and treated as "signed out".
    pub fn access_token(&self) -> Option<String> {
        match self.current() {
            Ok(credentials) => credentials.map(|c| c.access_token),
            Err(e) => {
                warn!(error = %e, "Failed to read stored credentials");
                None
            },
        }
    }

    /// Clears both tiers.
    pub fn clear(&self) -> Result<(), CredentialError> {
        // Attempt both even if the first fails.
        let session = self.session.clear();
        let persistent = self.persistent.clear();
        session?;
        persistent?;

        info!("Credentials cleared");
        Ok(())
    }
}

impl std::fmt::Debug for CredentialVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialVault")
            .field("session", &self.session.tier())
            .field("persistent", &self.persistent.tier())
            .finish()
    }
}
