//! HTTP adapter for the chat backend's REST API.
//!
//! Owns the single process-wide [`Session`] behind a mutex: connect and
//! reconnect happen only inside `ensure_connected`, and a caller that finds
//! a login already in flight waits on the lock instead of starting a
//! duplicate.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::json;

use super::session::Session;
use crate::domain::correlation::InboundMessage;
use crate::domain::foundation::{GroupId, Timestamp};
use crate::ports::{ChatSummary, ChatTransport, CredentialProvider, Credentials, TransportError};

/// Default session TTL: renew ahead of server-side expiry.
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Configuration for the chat backend adapter.
#[derive(Debug, Clone)]
pub struct ChatBackendConfig {
    /// Base URL of the chat backend API.
    pub base_url: String,
    /// Maximum session age before a renewal is forced.
    pub session_ttl: chrono::Duration,
    /// Per-request client timeout.
    pub timeout: Duration,
}

impl ChatBackendConfig {
    /// Creates a configuration with the given base URL and defaults.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session_ttl: chrono::Duration::hours(DEFAULT_SESSION_TTL_HOURS),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the session TTL.
    pub fn with_session_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    messages: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: String,
    sent_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct ChatsResponse {
    chats: Vec<WireChat>,
}

#[derive(Debug, Deserialize)]
struct WireChat {
    id: String,
    name: Option<String>,
}

/// Chat transport over the backend's REST API.
pub struct HttpChatTransport {
    config: ChatBackendConfig,
    client: Client,
    credentials: Arc<dyn CredentialProvider>,
    session: tokio::sync::Mutex<Option<Session>>,
}

impl HttpChatTransport {
    /// Creates the transport. Fails only if the HTTP client cannot be
    /// constructed.
    pub fn new(
        config: ChatBackendConfig,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TransportError::network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            credentials,
            session: tokio::sync::Mutex::new(None),
        })
    }

    /// Returns a usable bearer token, reusing the cached session when it is
    /// connected and younger than the TTL, otherwise restoring the persisted
    /// session and finally falling back to a fresh credential login.
    async fn ensure_connected(&self) -> Result<String, TransportError> {
        let mut guard = self.session.lock().await;

        if let Some(session) = guard.as_ref() {
            if session.is_usable(self.config.session_ttl) {
                return Ok(session.token().to_string());
            }
            tracing::info!("cached chat session stale or disconnected, renewing");
        }

        match self.credentials.load_session().await {
            Ok(Some(blob)) => {
                if self.verify_session(&blob).await {
                    tracing::info!("restored chat session from persisted state");
                    let session = Session::restored(Secret::new(blob));
                    let token = session.token().to_string();
                    *guard = Some(session);
                    return Ok(token);
                }
                tracing::warn!("persisted chat session rejected, performing fresh login");
            }
            Ok(None) => {}
            Err(err) => {
                tracing::warn!(error = %err, "failed to load persisted session state");
            }
        }

        let credentials = self
            .credentials
            .credentials()
            .await
            .map_err(|e| TransportError::authentication(e.to_string()))?;
        let token = self.login(&credentials).await?;

        if let Err(err) = self.credentials.store_session(&token).await {
            tracing::warn!(error = %err, "failed to persist session state");
        }

        let session = Session::new(Secret::new(token.clone()));
        *guard = Some(session);
        Ok(token)
    }

    /// Checks whether a persisted session blob is still accepted.
    async fn verify_session(&self, blob: &str) -> bool {
        let url = format!("{}/v1/auth/session", self.config.base_url);
        match self.client.get(url).bearer_auth(blob).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Performs a fresh credential login.
    async fn login(&self, credentials: &Credentials) -> Result<String, TransportError> {
        let url = format!("{}/v1/auth/login", self.config.base_url);
        let response = self
            .client
            .post(url)
            .json(&json!({
                "username": credentials.username(),
                "password": credentials.password().expose_secret(),
            }))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::authentication(format!(
                "login failed with status {}: {}",
                status.as_u16(),
                truncate(&body, 300)
            )));
        }

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| TransportError::backend(format!("malformed login response: {e}")))?;
        Ok(login.token)
    }

    /// Marks the cached session disconnected so the next call re-connects.
    async fn invalidate_session(&self) {
        if let Some(session) = self.session.lock().await.as_mut() {
            session.mark_disconnected();
        }
    }

    fn map_request_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.config.timeout.as_secs(),
            }
        } else if err.is_connect() {
            TransportError::network(format!("connection failed: {err}"))
        } else {
            TransportError::network(err.to_string())
        }
    }

    /// A rejected session on the request path is retryable, not fatal: the
    /// session is invalidated here, so the next `ensure_connected` performs
    /// a renewal. `Authentication` stays reserved for login failures, which
    /// abort a wait immediately.
    async fn map_error_status(&self, status: StatusCode, body: String) -> TransportError {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            self.invalidate_session().await;
            TransportError::backend(format!(
                "session rejected with status {}, renewing on next request",
                status.as_u16()
            ))
        } else {
            TransportError::backend(format!(
                "status {}: {}",
                status.as_u16(),
                truncate(&body, 300)
            ))
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, group_id: &GroupId, body: &str) -> Result<(), TransportError> {
        let token = self.ensure_connected().await?;
        let url = format!("{}/v1/groups/{}/messages", self.config.base_url, group_id);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&json!({ "content": body }))
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_error_status(status, body).await);
        }
        tracing::debug!(%group_id, "message sent");
        Ok(())
    }

    async fn poll_since(
        &self,
        group_id: &GroupId,
        since: Timestamp,
    ) -> Result<Vec<InboundMessage>, TransportError> {
        let token = self.ensure_connected().await?;
        let url = format!("{}/v1/groups/{}/messages", self.config.base_url, group_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("since", since.to_rfc3339())])
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_error_status(status, body).await);
        }

        let listing: MessagesResponse = response
            .json()
            .await
            .map_err(|e| TransportError::backend(format!("malformed message listing: {e}")))?;
        Ok(to_inbound(group_id, listing.messages, since))
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, TransportError> {
        let token = self.ensure_connected().await?;
        let url = format!("{}/v1/chats", self.config.base_url);

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.map_error_status(status, body).await);
        }

        let listing: ChatsResponse = response
            .json()
            .await
            .map_err(|e| TransportError::backend(format!("malformed chat listing: {e}")))?;
        Ok(to_summaries(listing.chats))
    }
}

/// Normalizes wire messages to UTC and applies the strictly-greater-than
/// cursor. The backend filters server-side too; this guards against clock
/// rounding on its end.
fn to_inbound(group_id: &GroupId, messages: Vec<WireMessage>, since: Timestamp) -> Vec<InboundMessage> {
    messages
        .into_iter()
        .filter_map(|message| {
            let received_at = Timestamp::from_datetime(message.sent_at);
            received_at
                .is_after(&since)
                .then(|| InboundMessage::new(group_id.clone(), message.content, received_at))
        })
        .collect()
}

/// Drops listings with an id the domain rejects instead of failing the
/// whole discovery call over one malformed entry.
fn to_summaries(chats: Vec<WireChat>) -> Vec<ChatSummary> {
    chats
        .into_iter()
        .filter_map(|chat| {
            GroupId::new(chat.id)
                .ok()
                .map(|id| ChatSummary::new(id, chat.name))
        })
        .collect()
}

fn truncate(body: &str, max: usize) -> String {
    if body.len() <= max {
        body.to_string()
    } else {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < max)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}…", &body[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_normalizes_trailing_slash() {
        let config = ChatBackendConfig::new("https://chat.example.com/");
        assert_eq!(config.base_url, "https://chat.example.com");
    }

    #[test]
    fn config_defaults() {
        let config = ChatBackendConfig::new("https://chat.example.com");
        assert_eq!(config.session_ttl, chrono::Duration::hours(24));
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn wire_messages_deserialize() {
        let raw = r#"{"messages":[{"content":"hi","sent_at":"2026-08-25T12:00:00Z"}]}"#;
        let listing: MessagesResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(listing.messages.len(), 1);
        assert_eq!(listing.messages[0].content, "hi");
    }

    #[test]
    fn to_inbound_applies_strict_cursor() {
        let group = GroupId::new("G1").unwrap();
        let cursor: DateTime<Utc> = "2026-08-25T12:00:00Z".parse().unwrap();
        let since = Timestamp::from_datetime(cursor);

        let messages = vec![
            WireMessage {
                content: "old".into(),
                sent_at: "2026-08-25T11:59:59Z".parse().unwrap(),
            },
            WireMessage {
                content: "boundary".into(),
                sent_at: cursor,
            },
            WireMessage {
                content: "new".into(),
                sent_at: "2026-08-25T12:00:01Z".parse().unwrap(),
            },
        ];

        let inbound = to_inbound(&group, messages, since);
        assert_eq!(inbound.len(), 1);
        assert_eq!(inbound[0].raw_content, "new");
    }

    #[test]
    fn chat_listing_drops_malformed_entries() {
        let chats = vec![
            WireChat {
                id: "19:abc@thread.v2".into(),
                name: Some("Relay ops".into()),
            },
            WireChat {
                id: "   ".into(),
                name: None,
            },
        ];

        let summaries = to_summaries(chats);
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, GroupId::new("19:abc@thread.v2").unwrap());
        assert_eq!(summaries[0].name.as_deref(), Some("Relay ops"));
    }

    #[test]
    fn truncate_preserves_short_bodies() {
        assert_eq!(truncate("short", 300), "short");
        let long = "x".repeat(400);
        let cut = truncate(&long, 300);
        assert!(cut.len() < 400);
        assert!(cut.ends_with('…'));
    }
}
