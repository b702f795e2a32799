// Drive client module: a small blocking HTTP client that uploads local
// files into a Drive folder using the session's bearer token.

use crate::auth::Session;
use crate::backup::{RemoteFile, Uploader};
use crate::error::{BackupError, Result};
use reqwest::blocking::{multipart, Client};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

/// Production Drive API host.
pub const DRIVE_API_URL: &str = "https://www.googleapis.com";

/// Client holding a reqwest blocking client, the API base URL and the
/// authenticated session used for every request.
#[derive(Clone)]
pub struct DriveClient {
    client: Client,
    base_url: String,
    session: Session,
}

/// Metadata part of a multipart upload.
#[derive(Serialize, Debug)]
struct FileMetadata<'a> {
    name: &'a str,
    parents: Vec<&'a str>,
}

/// Fields requested back from the upload endpoint.
#[derive(Deserialize, Debug)]
struct UploadResponse {
    id: String,
    #[serde(default)]
    name: Option<String>,
}

impl DriveClient {
    /// Client talking to the production Drive API.
    pub fn new(session: Session) -> Result<Self> {
        Self::with_base_url(session, DRIVE_API_URL)
    }

    /// Client talking to an arbitrary host (used against local test servers).
    pub fn with_base_url(session: Session, base_url: &str) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(DriveClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        let val = HeaderValue::from_str(&self.session.authorization())
            .map_err(|e| BackupError::Auth(format!("Invalid access token: {}", e)))?;
        headers.insert(AUTHORIZATION, val);
        Ok(headers)
    }

    fn upload_url(&self) -> String {
        format!(
            "{}/upload/drive/v3/files?uploadType=multipart&fields=id,name",
            self.base_url
        )
    }
}

/// Media type Drive records for `path`, guessed from its extension.
pub fn content_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

impl Uploader for DriveClient {
    /// Create a file named `name` under `folder_id`, streaming the bytes of
    /// `path` as the media part of a multipart request.
    fn upload(&self, path: &Path, name: &str, folder_id: &str) -> Result<RemoteFile> {
        let metadata = serde_json::to_string(&FileMetadata {
            name,
            parents: vec![folder_id],
        })?;
        let meta_part = multipart::Part::text(metadata).mime_str("application/json; charset=UTF-8")?;

        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let file_part = multipart::Part::reader_with_length(file, len)
            .file_name(name.to_string())
            .mime_str(&content_type(path))?;

        let form = multipart::Form::new()
            .part("metadata", meta_part)
            .part("file", file_part);

        log::debug!("POST {} ({} bytes)", self.upload_url(), len);
        let res = self
            .client
            .post(self.upload_url())
            .headers(self.auth_headers()?)
            .multipart(form)
            .send()?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().unwrap_or_default();
            return Err(BackupError::Http { status, body });
        }

        let resp: UploadResponse = res.json()?;
        Ok(RemoteFile {
            id: resp.id,
            name: resp.name.unwrap_or_else(|| name.to_string()),
        })
    }
}
