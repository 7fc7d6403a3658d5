//! Chat backend transport configuration

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;

/// Chat backend configuration (connection and session lifecycle)
#[derive(Debug, Clone, Deserialize)]
pub struct TransportConfig {
    /// Base URL of the chat backend API
    pub base_url: String,

    /// Login username
    pub username: String,

    /// Login password
    pub password: Secret<String>,

    /// Path of the persisted session blob
    #[serde(default = "default_session_file")]
    pub session_file: String,

    /// Session TTL in hours before a renewal is forced
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl TransportConfig {
    /// Validate transport configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidBackendUrl);
        }
        if self.username.is_empty() {
            return Err(ValidationError::MissingRequired("transport.username"));
        }
        if self.session_ttl_hours == 0 || self.session_ttl_hours > 168 {
            return Err(ValidationError::InvalidSessionTtl);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 300 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_session_file() -> String {
    "session.blob".to_string()
}

fn default_session_ttl_hours() -> u64 {
    24
}

fn default_request_timeout() -> u64 {
    30
}
