// Error types shared by every module of the library. Binaries wrap these
// in `anyhow` at the edges; the library itself returns `Result<T>`.

use thiserror::Error;

/// Every failure the backup library can report.
#[derive(Error, Debug)]
pub enum BackupError {
    /// The host OS has no backup root mapping.
    #[error("Unsupported operating system: {0}")]
    UnsupportedPlatform(String),

    /// Reading or writing the cached credential failed.
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// Authorization or token refresh failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The remote service answered with a non-success status.
    #[error("HTTP error: {status} - {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Missing or malformed client secrets.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A directory entry could not be read during traversal.
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl BackupError {
    /// True when the error stops a run before anything was touched.
    pub fn is_unsupported_platform(&self) -> bool {
        matches!(self, Self::UnsupportedPlatform(_))
    }
}

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, BackupError>;
