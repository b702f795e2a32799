// Library root
// -----------
// This crate backs up a fixed per-OS directory to Google Drive. Both
// binaries (`drive-backup` and `drive-shell`) are thin wrappers over it.
//
// Module responsibilities:
// - `platform`: maps the host OS to the directory that gets backed up.
// - `auth`: credential cache, OAuth token provider and the authenticator
//   that turns them into a session.
// - `drive`: blocking HTTP client that uploads files to Drive.
// - `backup`: the walk-and-upload loop and its per-file report.
// - `ops`: raw filesystem and command helpers used by the shell.
// - `shell`: interactive menu and console reporting.
// - `config` / `error`: client secrets, fixed names, error types.
pub mod auth;
pub mod backup;
pub mod config;
pub mod drive;
pub mod error;
pub mod ops;
pub mod platform;
pub mod shell;

pub use error::{BackupError, Result};

#[cfg(test)]
mod test_support;
