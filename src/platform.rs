// Path resolver: maps the host operating system to the fixed directory that
// gets backed up. There is no override and no check that the path exists.

use crate::error::{BackupError, Result};
use std::path::PathBuf;

/// Backup root on the Windows family.
pub const WINDOWS_ROOT: &str = r"C:\Users\Admin";

/// Backup root shared by Linux and macOS.
pub const UNIX_ROOT: &str = "/home";

/// Operating system families the tool knows how to back up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Windows,
    Linux,
    MacOs,
}

impl OsFamily {
    /// Parse an OS identifier. Accepts both the `std::env::consts::OS`
    /// spelling (`windows`, `linux`, `macos`) and the uname-style one
    /// (`Windows`, `Linux`, `Darwin`), case-insensitively.
    pub fn from_identifier(id: &str) -> Result<Self> {
        match id.to_ascii_lowercase().as_str() {
            "windows" => Ok(OsFamily::Windows),
            "linux" => Ok(OsFamily::Linux),
            "macos" | "darwin" => Ok(OsFamily::MacOs),
            _ => Err(BackupError::UnsupportedPlatform(id.to_string())),
        }
    }

    /// Detect the family of the running host.
    pub fn detect() -> Result<Self> {
        Self::from_identifier(std::env::consts::OS)
    }

    /// The fixed directory to back up for this family.
    pub fn backup_root(self) -> PathBuf {
        match self {
            OsFamily::Windows => PathBuf::from(WINDOWS_ROOT),
            OsFamily::Linux | OsFamily::MacOs => PathBuf::from(UNIX_ROOT),
        }
    }
}

/// Resolve the backup root for an explicit OS identifier.
pub fn backup_root_for(id: &str) -> Result<PathBuf> {
    OsFamily::from_identifier(id).map(OsFamily::backup_root)
}

/// Resolve the backup root for the host this process runs on.
pub fn resolve_backup_root() -> Result<PathBuf> {
    let family = OsFamily::detect()?;
    log::debug!("Detected OS family {:?}", family);
    Ok(family.backup_root())
}
