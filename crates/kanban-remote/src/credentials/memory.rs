use parking_lot::RwLock;

use super::{CredentialStore, Credentials, StorageTier};
use crate::error::CredentialError;

/// Session-scoped store kept in memory.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialError> {
        Ok(self.inner.read().clone())
    }

    fn store(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        *self.inner.write() = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.inner.write() = None;
        Ok(())
    }

    fn tier(&self) -> StorageTier {
        StorageTier::Session
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_load_clear() {
        let store = MemoryCredentialStore::new();
        assert!(store.load().unwrap().is_none());

        store.store(&Credentials::new("token-1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(Credentials::new("token-1")));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
        assert_eq!(store.tier(), StorageTier::Session);
    }
}
