// Raw filesystem and command utilities offered by the interactive shell.
// Each one is a thin wrapper over a single std call and returns a Result
// for the caller to report.

use crate::error::Result;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Names of the immediate entries of `path`, sorted.
pub fn list_dir(path: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Create `path` and any missing parents. Succeeds if it already exists.
pub fn make_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Remove a single file.
pub fn delete_file(path: &Path) -> Result<()> {
    fs::remove_file(path)?;
    Ok(())
}

/// Captured result of a shell command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

/// Runs arbitrary command lines through the system shell.
///
/// UNSAFE CAPABILITY: whatever the user types is executed with the
/// privileges of this process. There is no sandboxing or validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsafeShell;

impl UnsafeShell {
    pub fn run(&self, command: &str) -> Result<CommandOutput> {
        log::warn!("Executing unsandboxed shell command: {}", command);
        let output = if cfg!(target_os = "windows") {
            Command::new("cmd").args(["/C", command]).output()?
        } else {
            Command::new("sh").args(["-c", command]).output()?
        };
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}
