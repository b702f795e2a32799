// Google OAuth 2.0 for installed applications. Interactive authorization
// goes through the browser and a one-shot loopback listener; refresh is a
// plain form POST to the token endpoint.

use super::credential::{Credential, TokenResponse};
use crate::config::ClientSecrets;
use crate::error::{BackupError, Result};
use chrono::Utc;
use reqwest::blocking::Client;
use reqwest::Url;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::process::Command;

/// Full read/write access to the user's Drive.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Loopback ports tried in order for the redirect listener.
pub const LOOPBACK_PORTS: [u16; 2] = [8080, 8090];

/// Address the redirect listener binds to. The redirect URI names the same
/// literal so the browser never has to pick between IPv4 and IPv6.
pub const LOOPBACK_HOST: &str = "127.0.0.1";

const SUCCESS_PAGE: &str = "<html><body>The authentication flow has completed. You may close this window.</body></html>";

/// Produces fresh credentials. `Authenticator` only talks to this trait.
pub trait TokenProvider {
    /// Run the user-facing authorization flow. Blocks until it completes.
    fn authorize_interactive(&self) -> Result<Credential>;

    /// Exchange the refresh token of `credential` for a new access token.
    fn refresh(&self, credential: &Credential) -> Result<Credential>;
}

/// Token provider backed by Google's OAuth endpoints.
pub struct GoogleOAuth {
    client: Client,
    secrets: ClientSecrets,
    ports: Vec<u16>,
}

impl GoogleOAuth {
    pub fn new(secrets: ClientSecrets) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(GoogleOAuth {
            client,
            secrets,
            ports: LOOPBACK_PORTS.to_vec(),
        })
    }

    /// Override the loopback ports (0 lets the OS pick one).
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    /// Consent page URL for the given redirect target.
    pub fn authorization_url(&self, redirect_uri: &str) -> Result<Url> {
        Url::parse_with_params(
            &self.secrets.auth_uri,
            &[
                ("client_id", self.secrets.client_id.as_str()),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", DRIVE_SCOPE),
                ("access_type", "offline"),
                ("prompt", "consent"),
            ],
        )
        .map_err(|e| BackupError::Config(format!("Invalid auth_uri: {}", e)))
    }

    fn bind_listener(&self) -> Result<(TcpListener, u16)> {
        for &port in &self.ports {
            match TcpListener::bind((LOOPBACK_HOST, port)) {
                Ok(listener) => {
                    let port = listener.local_addr()?.port();
                    return Ok((listener, port));
                }
                Err(e) => log::debug!("Port {} unavailable: {}", port, e),
            }
        }
        Err(BackupError::Auth(format!(
            "Failed to start a local webserver on any of {:?}",
            self.ports
        )))
    }

    /// Accept connections until one carries the authorization response.
    fn wait_for_code(&self, listener: &TcpListener) -> Result<String> {
        for stream in listener.incoming() {
            let mut stream = stream?;
            let target = read_request_target(&stream)?;
            match parse_callback(&target) {
                Some(result) => {
                    respond(&mut stream, SUCCESS_PAGE)?;
                    return result;
                }
                // Favicon and other stray requests.
                None => respond(&mut stream, "")?,
            }
        }
        Err(BackupError::Auth("Local webserver stopped before authorization completed".into()))
    }

    fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let res = self
            .client
            .post(&self.secrets.token_uri)
            .form(params)
            .send()?;
        if !res.status().is_success() {
            let status = res.status();
            let txt = res.text().unwrap_or_default();
            return Err(BackupError::Auth(format!("Token request failed: {} - {}", status, txt)));
        }
        Ok(res.json()?)
    }
}

impl TokenProvider for GoogleOAuth {
    fn authorize_interactive(&self) -> Result<Credential> {
        let (listener, port) = self.bind_listener()?;
        let redirect_uri = redirect_uri(port);
        let url = self.authorization_url(&redirect_uri)?;

        println!("Your browser has been opened to visit:\n\n    {}\n", url);
        if !open_browser(url.as_str()) {
            println!("If your browser did not open, copy the link above into it.");
        }

        let code = self.wait_for_code(&listener)?;
        log::info!("Authorization code received, exchanging for tokens");
        let resp = self.request_token(&[
            ("code", code.as_str()),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])?;
        Ok(Credential::from_response(resp, Utc::now()))
    }

    fn refresh(&self, credential: &Credential) -> Result<Credential> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .ok_or_else(|| BackupError::Auth("Stored credential has no refresh token".into()))?;
        let resp = self.request_token(&[
            ("refresh_token", refresh_token),
            ("client_id", self.secrets.client_id.as_str()),
            ("client_secret", self.secrets.client_secret.as_str()),
            ("grant_type", "refresh_token"),
        ])?;
        let mut refreshed = Credential::from_response(resp, Utc::now());
        // Google usually omits the refresh token on refresh.
        if refreshed.refresh_token.is_none() {
            refreshed.refresh_token = credential.refresh_token.clone();
        }
        if refreshed.scope.is_none() {
            refreshed.scope = credential.scope.clone();
        }
        Ok(refreshed)
    }
}

/// Redirect target registered with the consent request.
pub fn redirect_uri(port: u16) -> String {
    format!("http://{}:{}/", LOOPBACK_HOST, port)
}

/// Read the request line and return its target (`/?code=...`).
fn read_request_target(stream: &TcpStream) -> Result<String> {
    let mut line = String::new();
    BufReader::new(stream).read_line(&mut line)?;
    Ok(line.split_whitespace().nth(1).unwrap_or("/").to_string())
}

/// `Some(Ok(code))` or `Some(Err(..))` for an authorization response,
/// `None` for any other request.
pub(crate) fn parse_callback(target: &str) -> Option<Result<String>> {
    let url = Url::parse("http://localhost").ok()?.join(target).ok()?;
    let mut code = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }
    match (code, error) {
        (_, Some(err)) => Some(Err(BackupError::Auth(format!("Authorization denied: {}", err)))),
        (Some(code), None) => Some(Ok(code)),
        (None, None) => None,
    }
}

fn respond(stream: &mut TcpStream, body: &str) -> Result<()> {
    write!(
        stream,
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    )?;
    stream.flush()?;
    Ok(())
}

/// Best effort; returns false when no opener could be launched.
fn open_browser(url: &str) -> bool {
    let status = if cfg!(target_os = "windows") {
        Command::new("cmd").args(["/C", "start", "", url]).status()
    } else if cfg!(target_os = "macos") {
        Command::new("open").arg(url).status()
    } else {
        Command::new("xdg-open").arg(url).status()
    };
    match status {
        Ok(s) => s.success(),
        Err(e) => {
            log::debug!("Could not open browser: {}", e);
            false
        }
    }
}
