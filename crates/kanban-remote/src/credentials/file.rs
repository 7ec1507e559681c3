use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{CredentialStore, Credentials, StorageTier};
use crate::error::CredentialError;

const FILE_NAME: &str = "credentials.json";

/// Persistent store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store writing `credentials.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(FILE_NAME),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credentials>, CredentialError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CredentialError::io(&self.path, e)),
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CredentialError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            })
    }

    fn store(&self, credentials: &Credentials) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| CredentialError::io(parent, e))?;
        }

        let raw = serde_json::to_string_pretty(credentials).map_err(|e| {
            CredentialError::Corrupt {
                path: self.path.clone(),
                reason: e.to_string(),
            }
        })?;

        // Atomic replace through a sibling temp file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, raw).map_err(|e| CredentialError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| CredentialError::io(&self.path, e))?;

        debug!(path = %self.path.display(), "Persistent credentials stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CredentialError::io(&self.path, e)),
        }
    }

    fn tier(&self) -> StorageTier {
        StorageTier::Persistent
    }
}
