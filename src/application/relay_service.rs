//! Relay service: the application-level use cases behind the HTTP surface.

use std::sync::Arc;

use thiserror::Error;

use crate::application::dispatch::{DispatchError, DispatchQueue};
use crate::domain::correlation::{CorrelationEngine, CorrelationError, OutboundMessage};
use crate::domain::extraction::ExtractedPayload;
use crate::domain::foundation::{ConversationId, CorrelationId, GroupId, Timestamp};
use crate::ports::{
    ChatSummary, ChatTransport, ExchangeRecord, LogSink, PreambleError, PreambleSource,
    TransportError,
};

/// Errors from the relay use cases.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Preamble(#[from] PreambleError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Correlation(#[from] CorrelationError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl RelayError {
    /// True when the failure is an expired wait rather than a hard error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Correlation(err) if err.is_timeout())
    }
}

/// Orchestrates the two relay flows: correlated AI exchanges and queued
/// custom sends.
pub struct RelayService {
    engine: CorrelationEngine,
    dispatch: DispatchQueue,
    transport: Arc<dyn ChatTransport>,
    preambles: Arc<dyn PreambleSource>,
    log_sink: Arc<dyn LogSink>,
    group_id: GroupId,
}

impl RelayService {
    /// Creates the service over the given collaborators.
    pub fn new(
        engine: CorrelationEngine,
        dispatch: DispatchQueue,
        transport: Arc<dyn ChatTransport>,
        preambles: Arc<dyn PreambleSource>,
        log_sink: Arc<dyn LogSink>,
        group_id: GroupId,
    ) -> Self {
        Self {
            engine,
            dispatch,
            transport,
            preambles,
            log_sink,
            group_id,
        }
    }

    /// Relays a message into the configured group and waits for the
    /// correlated reply.
    ///
    /// Runs one full exchange: load the preamble, tag the message with a
    /// fresh correlation id, send, then poll until the reply arrives or the
    /// wait times out. Both halves of the exchange are offered to the log
    /// sink; recording is best-effort and never fails the caller.
    pub async fn send_ai_message(
        &self,
        conversation_id: ConversationId,
        message: &str,
    ) -> Result<ExtractedPayload, RelayError> {
        let preamble = self.preambles.load().await?;
        let correlation_id = CorrelationId::new();
        let started_at = Timestamp::now();

        tracing::info!(
            %correlation_id,
            conversation_id = %conversation_id,
            "relaying message for correlated reply"
        );
        self.log_sink
            .record(ExchangeRecord::outbound(
                started_at,
                conversation_id.clone(),
                correlation_id,
                message,
            ))
            .await;

        self.engine
            .send_tagged(
                &self.group_id,
                &preamble,
                &conversation_id,
                message,
                correlation_id,
            )
            .await?;

        let payload = self
            .engine
            .await_reply(&self.group_id, correlation_id)
            .await?;

        self.log_sink
            .record(ExchangeRecord::reply(
                Timestamp::now(),
                conversation_id,
                correlation_id,
                payload.clone().into_value(),
            ))
            .await;

        Ok(payload)
    }

    /// Queues an untagged message for background delivery to an arbitrary
    /// group. Returns as soon as the message is accepted; no reply is
    /// awaited.
    pub fn send_custom_message(
        &self,
        group_id: GroupId,
        message: &str,
    ) -> Result<(), RelayError> {
        let outbound = OutboundMessage::new(group_id, message, CorrelationId::new());
        tracing::info!(
            group_id = %outbound.group_id(),
            "queueing custom message for dispatch"
        );
        self.dispatch.enqueue(outbound)?;
        Ok(())
    }

    /// Lists the chats visible to the relay's account, so operators can find
    /// the group id to configure.
    pub async fn list_groups(&self) -> Result<Vec<ChatSummary>, RelayError> {
        Ok(self.transport.list_chats().await?)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::adapters::log_sink::InMemoryLogSink;
    use crate::adapters::preamble::StaticPreambleSource;
    use crate::adapters::transport::MockChatTransport;
    use crate::domain::correlation::{EngineConfig, Preamble};

    fn group() -> GroupId {
        GroupId::new("G1").unwrap()
    }

    struct Fixture {
        transport: Arc<MockChatTransport>,
        log_sink: Arc<InMemoryLogSink>,
        service: RelayService,
    }

    fn fixture(reply_timeout: Duration) -> Fixture {
        let transport = Arc::new(MockChatTransport::new());
        let log_sink = Arc::new(InMemoryLogSink::new());
        let engine = CorrelationEngine::new(
            transport.clone(),
            EngineConfig::new()
                .with_reply_timeout(reply_timeout)
                .with_poll_interval(Duration::from_secs(1)),
        );
        let dispatch = DispatchQueue::spawn(transport.clone(), 2, Duration::from_secs(1));
        let service = RelayService::new(
            engine,
            dispatch,
            transport.clone(),
            Arc::new(StaticPreambleSource::new(Preamble::new(
                "prompt",
                "instructions",
            ))),
            log_sink.clone(),
            group(),
        );
        Fixture {
            transport,
            log_sink,
            service,
        }
    }

    /// Watches the transport for the tagged send, lifts the correlation id
    /// off the outbound body, and posts a reply carrying it.
    fn answer_next_send(transport: Arc<MockChatTransport>) {
        tokio::spawn(async move {
            loop {
                if let Some(sent) = transport.sent().into_iter().next() {
                    let id_line = sent
                        .body
                        .lines()
                        .find(|line| line.starts_with("id: "))
                        .map(|line| line.trim_start_matches("id: ").to_string())
                        .unwrap_or_default();
                    transport.post_inbound_at(
                        sent.group_id.clone(),
                        format!(r#"{{"reply_id": "{id_line}", "text": "answered"}}"#),
                        Timestamp::now().plus_secs(1),
                    );
                    break;
                }
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        });
    }

    #[tokio::test(start_paused = true)]
    async fn full_exchange_returns_the_reply_and_logs_both_halves() {
        let fx = fixture(Duration::from_secs(30));
        answer_next_send(fx.transport.clone());

        let payload = fx
            .service
            .send_ai_message(ConversationId::new("S1").unwrap(), "hi there")
            .await
            .unwrap();
        assert_eq!(payload.get("text").unwrap(), "answered");

        let sent = fx.transport.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].body.starts_with("prompt\ninstructions\nid: "));
        assert!(sent[0].body.ends_with("message: hi there"));

        let records = fx.log_sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message.as_deref(), Some("hi there"));
        assert_eq!(
            records[1].reply.as_ref().unwrap()["text"],
            serde_json::json!("answered")
        );
        assert_eq!(records[0].correlation_id, records[1].correlation_id);
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_surfaces_as_timeout_and_logs_only_the_outbound_half() {
        let fx = fixture(Duration::from_secs(5));

        let err = fx
            .service
            .send_ai_message(ConversationId::new("S1").unwrap(), "into the void")
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        let records = fx.log_sink.records();
        assert_eq!(records.len(), 1);
        assert!(records[0].reply.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn send_failure_aborts_before_any_wait() {
        let fx = fixture(Duration::from_secs(30));
        fx.transport
            .push_send_error(TransportError::authentication("login rejected"));

        let err = fx
            .service
            .send_ai_message(ConversationId::new("S1").unwrap(), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::Transport(_)));
        assert_eq!(fx.transport.poll_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_messages_go_through_the_dispatch_queue() {
        let fx = fixture(Duration::from_secs(30));
        let other_group = GroupId::new("G2").unwrap();

        fx.service
            .send_custom_message(other_group.clone(), "announcement")
            .unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        let sent = fx.transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].group_id, other_group);
        assert_eq!(sent[0].body, "announcement");
    }

    #[tokio::test]
    async fn group_listing_comes_from_the_transport() {
        let fx = fixture(Duration::from_secs(30));
        fx.transport.set_chats(vec![
            ChatSummary::new(GroupId::new("G1").unwrap(), Some("Ops".into())),
            ChatSummary::new(GroupId::new("G2").unwrap(), None),
        ]);

        let groups = fx.service.list_groups().await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name.as_deref(), Some("Ops"));
        assert_eq!(groups[1].id, GroupId::new("G2").unwrap());
    }

    #[tokio::test]
    async fn custom_message_overflow_is_reported() {
        let fx = fixture(Duration::from_secs(30));

        // Capacity is 2 and the worker has not run yet.
        fx.service.send_custom_message(group(), "one").unwrap();
        fx.service.send_custom_message(group(), "two").unwrap();
        let err = fx.service.send_custom_message(group(), "three").unwrap_err();
        assert!(matches!(err, RelayError::Dispatch(DispatchError::QueueFull)));
    }
}
