// Backup loop: walk the backup root and upload every regular file, one at
// a time, recording a typed outcome per file.

use crate::auth::{Authenticator, CredentialStore, FileCredentialStore, GoogleOAuth, Session, TokenProvider};
use crate::config::{ClientSecrets, ROOT_FOLDER_ID};
use crate::drive::DriveClient;
use crate::error::{BackupError, Result};
use crate::platform::resolve_backup_root;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file created on the remote side.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
}

/// Anything that can store one local file in a remote folder.
pub trait Uploader {
    fn upload(&self, path: &Path, name: &str, folder_id: &str) -> Result<RemoteFile>;
}

/// Result of uploading a single file.
#[derive(Debug)]
pub struct UploadOutcome {
    pub path: PathBuf,
    pub name: String,
    pub result: Result<RemoteFile>,
}

impl UploadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Everything that happened during one backup run.
#[derive(Debug, Default)]
pub struct BackupReport {
    pub root: PathBuf,
    pub outcomes: Vec<UploadOutcome>,
    /// Entries below the root that could not be read.
    pub walk_errors: Vec<BackupError>,
}

impl BackupReport {
    pub fn uploaded(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn failed(&self) -> impl Iterator<Item = &UploadOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    pub fn uploaded_count(&self) -> usize {
        self.uploaded().count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed().count()
    }
}

/// Destination name of a local file: its base name.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Upload every regular file below `root` into `folder_id`.
///
/// Nothing is filtered. A symlink to a file is uploaded through the link; a
/// dangling one is recorded as a failure. A failure on one file,
/// or an unreadable directory below the root, is recorded and the walk goes
/// on. Only an unreadable root is returned as an error.
pub fn run_backup<U: Uploader>(
    root: &Path,
    uploader: &U,
    folder_id: &str,
    progress: &ProgressBar,
) -> Result<BackupReport> {
    let mut report = BackupReport {
        root: root.to_path_buf(),
        ..Default::default()
    };

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                report.walk_errors.push(e.into());
                continue;
            }
        };
        // Symlinks are uploaded through the link when they point at a file;
        // linked directories are never descended into.
        let is_link = entry.path_is_symlink();
        if !is_link && !entry.file_type().is_file() {
            continue;
        }

        let path = entry.into_path();
        let target = if is_link {
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => Ok(()),
                Ok(_) => continue,
                Err(e) => Err(BackupError::from(e)),
            }
        } else {
            Ok(())
        };

        let name = display_name(&path);
        progress.set_message(format!("Uploading {}...", name));

        let result = target.and_then(|()| uploader.upload(&path, &name, folder_id));
        match &result {
            Ok(remote) => {
                log::info!("Uploaded {} as {}", path.display(), remote.id);
                progress.println(format!("Uploaded: {}", name));
            }
            Err(e) => {
                log::warn!("Failed to upload {}: {}", path.display(), e);
                progress.println(format!("Failed to upload {}: {}", path.display(), e));
            }
        }
        progress.inc(1);
        report.outcomes.push(UploadOutcome { path, name, result });
    }

    Ok(report)
}

/// Authenticate, then back up `root` with an uploader built from the
/// session. An error here ends the attempt before any upload.
pub fn backup_to_cloud<S, P, U, F>(
    root: &Path,
    authenticator: &Authenticator<S, P>,
    make_uploader: F,
    progress: &ProgressBar,
) -> Result<BackupReport>
where
    S: CredentialStore,
    P: TokenProvider,
    U: Uploader,
    F: FnOnce(Session) -> Result<U>,
{
    // The consent prompt prints to stdout; keep the spinner off it.
    let (session, path) = progress.suspend(|| authenticator.authenticate())?;
    log::debug!("Session ready via {:?}", path);
    let uploader = make_uploader(session)?;
    run_backup(root, &uploader, ROOT_FOLDER_ID, progress)
}

/// The full production pipeline: host root, cached Google credentials in
/// the working directory, uploads into the Drive root folder.
pub fn backup_home(progress: &ProgressBar) -> Result<BackupReport> {
    let root = resolve_backup_root()?;
    progress.println(format!("Backing up files from: {}", root.display()));

    let secrets = ClientSecrets::load()?;
    let authenticator = Authenticator::new(FileCredentialStore::default(), GoogleOAuth::new(secrets)?);
    backup_to_cloud(&root, &authenticator, DriveClient::new, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;

    /// Records every call; fails for names listed in `fail_on`.
    #[derive(Default)]
    struct RecordingUploader {
        calls: RefCell<Vec<(String, String, Vec<u8>)>>,
        fail_on: Vec<&'static str>,
    }

    impl Uploader for RecordingUploader {
        fn upload(&self, path: &Path, name: &str, folder_id: &str) -> Result<RemoteFile> {
            let bytes = fs::read(path)?;
            self.calls
                .borrow_mut()
                .push((name.to_string(), folder_id.to_string(), bytes));
            if self.fail_on.contains(&name) {
                return Err(BackupError::Http {
                    status: 500,
                    body: "simulated".into(),
                });
            }
            Ok(RemoteFile {
                id: format!("id-{}", name),
                name: name.to_string(),
            })
        }
    }

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "beta").unwrap();
        fs::write(dir.path().join("sub/deeper/c.bin"), [1u8, 2, 3]).unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        dir
    }

    #[test]
    fn test_one_upload_per_regular_file() {
        let dir = tree();
        let uploader = RecordingUploader::default();
        let report = run_backup(dir.path(), &uploader, "root", &ProgressBar::hidden()).unwrap();

        assert_eq!(report.attempted(), 3);
        assert_eq!(report.uploaded_count(), 3);
        let mut calls = uploader.calls.into_inner();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("a.txt".to_string(), "root".to_string(), b"alpha".to_vec()),
                ("b.txt".to_string(), "root".to_string(), b"beta".to_vec()),
                ("c.bin".to_string(), "root".to_string(), vec![1, 2, 3]),
            ]
        );
    }

    #[test]
    fn test_failure_does_not_abort_walk() {
        let dir = tree();
        let uploader = RecordingUploader {
            fail_on: vec!["a.txt"],
            ..Default::default()
        };
        let report = run_backup(dir.path(), &uploader, "root", &ProgressBar::hidden()).unwrap();

        assert_eq!(uploader.calls.borrow().len(), 3);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.uploaded_count(), 2);
        let failed: Vec<_> = report.failed().map(|o| o.name.as_str()).collect();
        assert_eq!(failed, vec!["a.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_followed() {
        use std::os::unix::fs::symlink;

        let outside = tempfile::tempdir().unwrap();
        fs::write(outside.path().join("real.txt"), "linked").unwrap();
        fs::create_dir(outside.path().join("linked_dir")).unwrap();
        fs::write(outside.path().join("linked_dir/hidden.txt"), "no").unwrap();

        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "alpha").unwrap();
        symlink(outside.path().join("real.txt"), dir.path().join("link.txt")).unwrap();
        symlink(dir.path().join("missing"), dir.path().join("dangling.txt")).unwrap();
        symlink(outside.path().join("linked_dir"), dir.path().join("dir_link")).unwrap();

        let uploader = RecordingUploader::default();
        let report = run_backup(dir.path(), &uploader, "root", &ProgressBar::hidden()).unwrap();

        assert_eq!(report.attempted(), 3);
        let uploaded: Vec<_> = report.uploaded().map(|o| o.name.as_str()).collect();
        assert_eq!(uploaded, vec!["a.txt", "link.txt"]);
        let failed: Vec<_> = report.failed().map(|o| o.name.as_str()).collect();
        assert_eq!(failed, vec!["dangling.txt"]);
        assert!(matches!(report.failed().next().unwrap().result, Err(BackupError::Io(_))));

        let calls = uploader.calls.borrow();
        assert!(calls.iter().any(|(name, _, bytes)| name == "link.txt" && bytes == b"linked"));
        assert!(!calls.iter().any(|(name, _, _)| name == "hidden.txt"));
    }

    #[test]
    fn test_missing_root_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let uploader = RecordingUploader::default();
        let err = run_backup(&dir.path().join("gone"), &uploader, "root", &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, BackupError::Walk(_)));
        assert!(uploader.calls.borrow().is_empty());
    }

    #[test]
    fn test_display_name_is_base_name() {
        assert_eq!(display_name(Path::new("/home/user/docs/report.pdf")), "report.pdf");
        assert_eq!(display_name(Path::new("plain")), "plain");
    }
}
