// Configuration: fixed file names and the OAuth client secrets downloaded
// from the Google Cloud console.

use crate::error::{BackupError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Cached credential file, relative to the working directory.
pub const CREDENTIALS_FILE: &str = "credentials.json";

/// OAuth client secrets file name.
pub const CLIENT_SECRETS_FILE: &str = "client_secrets.json";

/// Well-known identifier of the Drive root folder.
pub const ROOT_FOLDER_ID: &str = "root";

const DEFAULT_AUTH_URI: &str = "https://accounts.google.com/o/oauth2/auth";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// OAuth client registration. Field names follow the console download.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_auth_uri() -> String {
    DEFAULT_AUTH_URI.into()
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.into()
}

/// The console wraps the registration in either an `installed` or a `web`
/// object depending on the application type.
#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

impl ClientSecrets {
    /// Parse a client secrets document.
    pub fn from_json(data: &str) -> Result<Self> {
        let file: SecretsFile = serde_json::from_str(data)?;
        file.installed.or(file.web).ok_or_else(|| {
            BackupError::Config("client secrets must contain an \"installed\" or \"web\" section".into())
        })
    }

    /// Load client secrets from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&data)
    }

    /// Load client secrets from the first location that has them: the
    /// working directory, then the per-user config directory.
    pub fn load() -> Result<Self> {
        let candidates = secrets_search_paths();
        for path in &candidates {
            if path.is_file() {
                log::debug!("Loading client secrets from {}", path.display());
                return Self::load_from(path);
            }
        }
        Err(BackupError::Config(format!(
            "{} not found. Tried: {:?}",
            CLIENT_SECRETS_FILE, candidates
        )))
    }
}

/// Locations searched for the client secrets file, in order.
pub fn secrets_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CLIENT_SECRETS_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("drive-backup").join(CLIENT_SECRETS_FILE));
    }
    paths
}
