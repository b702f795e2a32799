// Turns whatever is in the credential store into a usable session,
// authorizing or refreshing first when needed.

use super::credential::Session;
use super::oauth::TokenProvider;
use super::store::CredentialStore;
use crate::error::Result;

/// Which branch produced the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPath {
    /// Nothing stored; the interactive flow ran.
    Authorized,
    /// Stored credential had expired and was refreshed.
    Refreshed,
    /// Stored credential was still valid.
    Reused,
}

pub struct Authenticator<S, P> {
    store: S,
    provider: P,
}

impl<S: CredentialStore, P: TokenProvider> Authenticator<S, P> {
    pub fn new(store: S, provider: P) -> Self {
        Authenticator { store, provider }
    }

    /// Load, then authorize, refresh or reuse. The resulting credential is
    /// always written back to the store before the session is returned.
    pub fn authenticate(&self) -> Result<(Session, AuthPath)> {
        let (credential, path) = match self.store.load()? {
            None => {
                log::info!("No stored credential, starting interactive authorization");
                (self.provider.authorize_interactive()?, AuthPath::Authorized)
            }
            Some(stored) if stored.is_expired() => {
                log::info!("Stored credential expired, refreshing");
                (self.provider.refresh(&stored)?, AuthPath::Refreshed)
            }
            Some(stored) => {
                log::info!("Reusing stored credential");
                (stored, AuthPath::Reused)
            }
        };

        self.store.save(&credential)?;
        Ok((Session::new(&credential), path))
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
