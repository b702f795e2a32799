// Credential cache. The authenticator only sees the `CredentialStore`
// trait so tests can substitute their own store.

use super::credential::Credential;
use crate::config::CREDENTIALS_FILE;
use crate::error::{BackupError, Result};
use std::path::{Path, PathBuf};

/// Somewhere a credential can be loaded from and saved back to.
pub trait CredentialStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<Credential>>;
    fn save(&self, credential: &Credential) -> Result<()>;
}

/// Stores the credential as cleartext JSON in a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCredentialStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileCredentialStore {
    /// `credentials.json` in the working directory.
    fn default() -> Self {
        FileCredentialStore::new(CREDENTIALS_FILE)
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&self.path).map_err(|e| {
            BackupError::CredentialStore(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        let credential = serde_json::from_str(&data).map_err(|e| {
            BackupError::CredentialStore(format!("Failed to parse {}: {}", self.path.display(), e))
        })?;
        Ok(Some(credential))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let data = serde_json::to_string_pretty(credential)?;
        std::fs::write(&self.path, data).map_err(|e| {
            BackupError::CredentialStore(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        log::debug!("Saved credential to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample() -> Credential {
        Credential {
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            token_expiry: Some(Utc::now()),
            token_type: "Bearer".into(),
            scope: Some("https://www.googleapis.com/auth/drive".into()),
        }
    }

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("credentials.json"));
        let cred = sample();
        store.save(&cred).unwrap();
        assert_eq!(store.load().unwrap(), Some(cred));
    }

    #[test]
    fn test_corrupt_file_is_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not json").unwrap();
        let err = FileCredentialStore::new(path).load().unwrap_err();
        assert!(matches!(err, BackupError::CredentialStore(_)));
    }

    #[test]
    fn test_default_path() {
        assert_eq!(FileCredentialStore::default().path(), Path::new("credentials.json"));
    }
}
