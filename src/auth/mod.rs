// Authentication: credential cache, OAuth token provider and the
// authenticator that combines them into a `Session`.

pub mod authenticator;
pub mod credential;
pub mod oauth;
pub mod store;

pub use authenticator::{AuthPath, Authenticator};
pub use credential::{Credential, Session};
pub use oauth::{GoogleOAuth, TokenProvider};
pub use store::{CredentialStore, FileCredentialStore};
