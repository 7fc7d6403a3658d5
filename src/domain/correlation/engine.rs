//! Correlation engine: tagged sends and polled waits for correlated replies.
//!
//! This is a polling design, not a push subscription: the transport's event
//! push is unreliable across session restarts, so the engine trades up to
//! one poll interval of detection latency for robustness against reconnect
//! races.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::domain::correlation::wait::CorrelationWait;
use crate::domain::correlation::{compose_tagged_body, Preamble};
use crate::domain::extraction::{ContentExtractor, ExtractedPayload};
use crate::domain::foundation::{ConversationId, CorrelationId, GroupId, Timestamp};
use crate::ports::{ChatTransport, TransportError};

/// Default hard deadline for a wait.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(120);

/// Default pause between poll cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Tunables for the engine's wait loop.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Hard deadline: a wait resolves `Timeout` once this much time passed
    /// without a matching reply.
    pub reply_timeout: Duration,
    /// Sleep between poll cycles.
    pub poll_interval: Duration,
}

impl EngineConfig {
    /// Creates a config with the default 120s timeout and 1s interval.
    pub fn new() -> Self {
        Self {
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Sets the reply timeout.
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors resolving a correlated wait.
///
/// `Timeout` is distinct from transport failure so callers can render a
/// "try again" message instead of an error.
#[derive(Debug, Error)]
pub enum CorrelationError {
    #[error("no matching reply within {waited_secs}s")]
    Timeout {
        /// How long the wait polled before giving up.
        waited_secs: u64,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl CorrelationError {
    /// True when the wait expired without a matching reply.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Sends correlation-tagged messages and waits for their replies.
///
/// Cancellation is cooperative through future drop: when the caller stops
/// awaiting (an HTTP client disconnect drops the handler future), the poll
/// loop stops at its next await point.
pub struct CorrelationEngine {
    transport: Arc<dyn ChatTransport>,
    extractor: ContentExtractor,
    config: EngineConfig,
}

impl CorrelationEngine {
    /// Creates an engine over the given transport.
    pub fn new(transport: Arc<dyn ChatTransport>, config: EngineConfig) -> Self {
        Self {
            transport,
            extractor: ContentExtractor::new(),
            config,
        }
    }

    /// Composes and sends the tagged outbound body.
    ///
    /// Failures here propagate immediately: a message that never went out
    /// has no reply to wait for.
    pub async fn send_tagged(
        &self,
        group_id: &GroupId,
        preamble: &Preamble,
        conversation_id: &ConversationId,
        human_message: &str,
        correlation_id: CorrelationId,
    ) -> Result<(), TransportError> {
        let body = compose_tagged_body(preamble, correlation_id, conversation_id, human_message);
        tracing::info!(%group_id, %correlation_id, "sending tagged message");
        self.transport.send(group_id, &body).await
    }

    /// Waits for the reply carrying `correlation_id`, using the configured
    /// timeout.
    pub async fn await_reply(
        &self,
        group_id: &GroupId,
        correlation_id: CorrelationId,
    ) -> Result<ExtractedPayload, CorrelationError> {
        self.await_reply_with_timeout(group_id, correlation_id, self.config.reply_timeout)
            .await
    }

    /// Waits for the reply carrying `correlation_id` with an explicit
    /// timeout.
    ///
    /// Polls the transport for messages newer than the wait's start, runs
    /// the extractor on each in arrival order, and returns the first payload
    /// whose correlation field matches. Transient transport failures during
    /// polling are logged and absorbed; authentication failures abort the
    /// wait immediately.
    pub async fn await_reply_with_timeout(
        &self,
        group_id: &GroupId,
        correlation_id: CorrelationId,
        timeout: Duration,
    ) -> Result<ExtractedPayload, CorrelationError> {
        let started_at = Timestamp::now();
        let started = tokio::time::Instant::now();
        let mut wait = CorrelationWait::new(
            correlation_id,
            group_id.clone(),
            started_at.plus_millis(timeout.as_millis() as u64),
        );

        loop {
            match self.transport.poll_since(group_id, started_at).await {
                Ok(messages) => {
                    for message in messages {
                        let Some(payload) = self.extractor.extract(&message.raw_content) else {
                            tracing::debug!(
                                %group_id,
                                received_at = %message.received_at.to_rfc3339(),
                                "inbound message yielded no payload"
                            );
                            continue;
                        };
                        // First match wins; remaining messages are not scanned.
                        if wait.observe(payload) {
                            tracing::info!(%correlation_id, "matching reply found");
                            if let Some(matched) = wait.matched() {
                                return Ok(matched.clone());
                            }
                        }
                    }
                }
                Err(err) if err.is_authentication() => {
                    tracing::error!(error = %err, %correlation_id, "wait aborted: cannot establish session");
                    return Err(CorrelationError::Transport(err));
                }
                Err(err) => {
                    // Transient connectivity blips must not fail an
                    // otherwise-successful exchange.
                    tracing::warn!(error = %err, %correlation_id, "poll failed, continuing wait");
                }
            }

            if started.elapsed() >= timeout {
                wait.time_out();
                let waited_secs = started.elapsed().as_secs();
                tracing::info!(%correlation_id, waited_secs, "wait timed out without a matching reply");
                return Err(CorrelationError::Timeout { waited_secs });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
