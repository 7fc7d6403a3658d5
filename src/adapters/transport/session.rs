//! Session value object for the chat backend connection.

use chrono::Duration;
use secrecy::{ExposeSecret, Secret};

use crate::domain::foundation::Timestamp;

/// One authenticated connection to the chat backend.
///
/// Exactly one live session exists process-wide; the transport adapter owns
/// it behind a mutex and replaces it when it goes stale or disconnected.
#[derive(Debug, Clone)]
pub struct Session {
    token: Secret<String>,
    created_at: Timestamp,
    connected: bool,
}

impl Session {
    /// Creates a freshly-established session.
    pub fn new(token: Secret<String>) -> Self {
        Self {
            token,
            created_at: Timestamp::now(),
            connected: true,
        }
    }

    /// Rebuilds a session restored from a persisted blob, keeping the
    /// original creation time unknown and treating it as fresh.
    pub fn restored(token: Secret<String>) -> Self {
        Self::new(token)
    }

    /// The bearer token for backend requests.
    pub fn token(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Marks the session as no longer usable (backend rejected it).
    pub fn mark_disconnected(&mut self) {
        self.connected = false;
    }

    /// True when the session is connected and younger than `ttl`.
    ///
    /// A stale session is discarded even if the backend might still accept
    /// it; the 24h default TTL keeps renewal ahead of server-side expiry.
    pub fn is_usable(&self, ttl: Duration) -> bool {
        self.connected && Timestamp::now().duration_since(&self.created_at) < ttl
    }

    #[cfg(test)]
    pub(crate) fn with_created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = created_at;
        self
    }
}
