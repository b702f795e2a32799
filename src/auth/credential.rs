// Token material persisted between runs, and the session handed to the
// uploader once authentication is done.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth token set as stored in the credential cache.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry instant. `None` means the token never expires.
    #[serde(default)]
    pub token_expiry: Option<DateTime<Utc>>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".into()
}

/// Token endpoint response body.
#[derive(Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: Option<String>,
}

impl Credential {
    /// Build a credential from a token response received at `now`.
    pub fn from_response(resp: TokenResponse, now: DateTime<Utc>) -> Self {
        Credential {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            token_expiry: resp.expires_in.map(|secs| now + Duration::seconds(secs)),
            token_type: resp.token_type,
            scope: resp.scope,
        }
    }

    /// Expired as soon as the expiry instant is reached. No margin.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.token_expiry.map_or(false, |expiry| expiry <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// Authenticated handle used for every upload of a run.
#[derive(Debug, Clone)]
pub struct Session {
    access_token: String,
    token_type: String,
}

impl Session {
    pub fn new(credential: &Credential) -> Self {
        Session {
            access_token: credential.access_token.clone(),
            token_type: credential.token_type.clone(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credential(expiry: Option<DateTime<Utc>>) -> Credential {
        Credential {
            access_token: "ya29.token".into(),
            refresh_token: Some("1//refresh".into()),
            token_expiry: expiry,
            token_type: "Bearer".into(),
            scope: None,
        }
    }

    #[test]
    fn test_expiry_has_no_margin() {
        let now = Utc::now();
        assert!(credential(Some(now)).is_expired_at(now));
        assert!(!credential(Some(now + Duration::seconds(1))).is_expired_at(now));
        assert!(credential(Some(now - Duration::seconds(1))).is_expired_at(now));
    }

    #[test]
    fn test_no_expiry_never_expires() {
        assert!(!credential(None).is_expired());
    }

    #[test]
    fn test_from_response_sets_expiry() {
        let now = Utc::now();
        let resp: TokenResponse =
            serde_json::from_str(r#"{"access_token": "abc", "expires_in": 3599}"#).unwrap();
        let cred = Credential::from_response(resp, now);
        assert_eq!(cred.token_expiry, Some(now + Duration::seconds(3599)));
        assert_eq!(cred.token_type, "Bearer");
        assert!(cred.refresh_token.is_none());
    }

    #[test]
    fn test_session_authorization_header() {
        let session = Session::new(&credential(None));
        assert_eq!(session.authorization(), "Bearer ya29.token");
        assert_eq!(session.access_token(), "ya29.token");
    }
}
