//! Credential storage.
//!
//! Two tiers exist: a session tier that lives as long as the process and a
//! persistent tier that survives restarts. The "keep me signed in" flag at
//! login picks the tier; logout clears both.

mod file;
mod memory;
mod vault;

use serde::{Deserialize, Serialize};

use crate::error::CredentialError;

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;
pub use vault::CredentialVault;

/// Tokens issued by the backend at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
        }
    }
}

/// Lifetime of a credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageTier {
    /// Cleared when the process exits.
    Session,
    /// Survives restarts.
    Persistent,
}

/// A place where credentials are kept.
pub trait CredentialStore: Send + Sync {
    /// Returns the stored credentials, if any.
    fn load(&self) -> Result<Option<Credentials>, CredentialError>;

    /// Replaces the stored credentials.
    fn store(&self, credentials: &Credentials) -> Result<(), CredentialError>;

    /// Removes the stored credentials. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), CredentialError>;

    /// Returns the tier this store implements.
    fn tier(&self) -> StorageTier;
}
