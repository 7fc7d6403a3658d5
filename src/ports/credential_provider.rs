//! Credential Provider Port - Supplies transport credentials and persisted
//! session state.
//!
//! Renewal policy beyond the session TTL check lives with the provider, not
//! the relay.

use async_trait::async_trait;
use secrecy::Secret;
use thiserror::Error;

/// Username/password pair for a fresh transport login.
#[derive(Debug, Clone)]
pub struct Credentials {
    username: String,
    password: Secret<String>,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: impl Into<String>, password: Secret<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &Secret<String> {
        &self.password
    }
}

/// Port for credential and session-blob storage.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns the login credentials.
    async fn credentials(&self) -> Result<Credentials, CredentialError>;

    /// Returns the persisted session blob from a previous login, if any.
    async fn load_session(&self) -> Result<Option<String>, CredentialError>;

    /// Persists the session blob for reuse across restarts. Best-effort:
    /// a failed store degrades to a fresh login next time.
    async fn store_session(&self, blob: &str) -> Result<(), CredentialError>;
}

/// Credential provider errors.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credentials unavailable: {0}")]
    Unavailable(String),

    #[error("session storage error: {0}")]
    Storage(String),
}
