//! Chat Transport Port - Interface to the external chat backend.
//!
//! The transport provides group-based messaging with send and message-listing
//! operations. Adapters own session establishment and renewal internally;
//! callers see only classified errors, never panics or raw client failures.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::correlation::InboundMessage;
use crate::domain::foundation::{GroupId, Timestamp};

/// One chat visible to the relay's account, as listed for operators
/// discovering which group id to configure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatSummary {
    /// Transport identifier of the chat.
    pub id: GroupId,
    /// Display name, when the backend reports one.
    pub name: Option<String>,
}

impl ChatSummary {
    /// Creates a chat summary.
    pub fn new(id: GroupId, name: Option<String>) -> Self {
        Self { id, name }
    }
}

/// Port for the external chat backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends `body` as a message to the chat identified by `group_id`.
    ///
    /// Any transport failure is returned as a classified [`TransportError`];
    /// nothing is raised past this boundary.
    async fn send(&self, group_id: &GroupId, body: &str) -> Result<(), TransportError>;

    /// Returns all messages in the chat observed with a timestamp strictly
    /// greater than `since`, normalized to UTC, in arrival order.
    ///
    /// Idempotent, non-destructive read: messages are never marked consumed,
    /// so callers may rescan freely (matching is by correlation id, not
    /// position).
    async fn poll_since(
        &self,
        group_id: &GroupId,
        since: Timestamp,
    ) -> Result<Vec<InboundMessage>, TransportError>;

    /// Lists the chats visible to the relay's account, most recent first.
    ///
    /// Operator-facing discovery: the result names candidate group ids, it
    /// plays no part in the correlation flow.
    async fn list_chats(&self) -> Result<Vec<ChatSummary>, TransportError>;
}

/// Chat transport errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Credential or session failure. Fatal to the current request; never
    /// retried inside the core.
    #[error("transport authentication failed: {reason}")]
    Authentication {
        /// What the backend reported.
        reason: String,
    },

    /// Network-level failure reaching the backend.
    #[error("transport network error: {0}")]
    Network(String),

    /// The backend answered with an error.
    #[error("chat backend error: {message}")]
    Backend {
        /// Error details, truncated by the adapter.
        message: String,
    },

    /// The request exceeded the configured client timeout.
    #[error("transport request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },
}

impl TransportError {
    /// Creates an authentication error.
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// True for credential/session failures, which fail a wait immediately
    /// instead of being absorbed as transient misses.
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// True if a later attempt may succeed without operator intervention.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Backend { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_is_not_retryable() {
        let err = TransportError::authentication("bad password");
        assert!(err.is_authentication());
        assert!(!err.is_retryable());
    }

    #[test]
    fn transient_failures_are_retryable() {
        assert!(TransportError::network("connection reset").is_retryable());
        assert!(TransportError::backend("500").is_retryable());
        assert!(TransportError::Timeout { timeout_secs: 30 }.is_retryable());
    }

    #[test]
    fn errors_display_their_cause() {
        let err = TransportError::authentication("expired session");
        assert_eq!(
            err.to_string(),
            "transport authentication failed: expired session"
        );
    }
}
