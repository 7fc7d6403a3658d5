//! In-memory transport for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::correlation::InboundMessage;
use crate::domain::foundation::{GroupId, Timestamp};
use crate::ports::{ChatSummary, ChatTransport, TransportError};

/// One message captured by [`MockChatTransport::send`].
#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub group_id: GroupId,
    pub body: String,
}

/// Scriptable in-memory [`ChatTransport`].
///
/// Messages posted with [`post_inbound_at`](Self::post_inbound_at) become
/// visible to `poll_since` with the given timestamp; errors pushed with
/// [`push_poll_error`](Self::push_poll_error) are returned one per poll
/// before any messages.
#[derive(Default)]
pub struct MockChatTransport {
    sent: Mutex<Vec<SentMessage>>,
    inbound: Mutex<Vec<InboundMessage>>,
    poll_errors: Mutex<Vec<TransportError>>,
    send_errors: Mutex<Vec<TransportError>>,
    poll_count: Mutex<usize>,
    chats: Mutex<Vec<ChatSummary>>,
}

impl MockChatTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages captured by `send`, in call order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Posts a message that `poll_since` will surface for `group_id` when
    /// the cursor is older than `received_at`.
    pub fn post_inbound_at(
        &self,
        group_id: GroupId,
        content: impl Into<String>,
        received_at: Timestamp,
    ) {
        self.inbound
            .lock()
            .unwrap()
            .push(InboundMessage::new(group_id, content, received_at));
    }

    /// Queues an error for the next `poll_since` call. Errors drain in FIFO
    /// order, one per call.
    pub fn push_poll_error(&self, error: TransportError) {
        self.poll_errors.lock().unwrap().push(error);
    }

    /// Queues an error for the next `send` call.
    pub fn push_send_error(&self, error: TransportError) {
        self.send_errors.lock().unwrap().push(error);
    }

    /// Number of `poll_since` calls observed.
    pub fn poll_count(&self) -> usize {
        *self.poll_count.lock().unwrap()
    }

    /// Replaces the chat listing returned by `list_chats`.
    pub fn set_chats(&self, chats: Vec<ChatSummary>) {
        *self.chats.lock().unwrap() = chats;
    }
}

#[async_trait]
impl ChatTransport for MockChatTransport {
    async fn send(&self, group_id: &GroupId, body: &str) -> Result<(), TransportError> {
        let queued = {
            let mut errors = self.send_errors.lock().unwrap();
            if errors.is_empty() {
                None
            } else {
                Some(errors.remove(0))
            }
        };
        if let Some(error) = queued {
            return Err(error);
        }

        self.sent.lock().unwrap().push(SentMessage {
            group_id: group_id.clone(),
            body: body.to_string(),
        });
        Ok(())
    }

    async fn poll_since(
        &self,
        group_id: &GroupId,
        since: Timestamp,
    ) -> Result<Vec<InboundMessage>, TransportError> {
        *self.poll_count.lock().unwrap() += 1;

        let queued = {
            let mut errors = self.poll_errors.lock().unwrap();
            if errors.is_empty() {
                None
            } else {
                Some(errors.remove(0))
            }
        };
        if let Some(error) = queued {
            return Err(error);
        }

        Ok(self
            .inbound
            .lock()
            .unwrap()
            .iter()
            .filter(|message| &message.group_id == group_id && message.received_at.is_after(&since))
            .cloned()
            .collect())
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>, TransportError> {
        Ok(self.chats.lock().unwrap().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> GroupId {
        GroupId::new("G1").unwrap()
    }

    #[tokio::test]
    async fn captures_sent_messages() {
        let transport = MockChatTransport::new();
        transport.send(&group(), "hello").await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].body, "hello");
        assert_eq!(sent[0].group_id, group());
    }

    #[tokio::test]
    async fn poll_filters_by_group_and_cursor() {
        let transport = MockChatTransport::new();
        let now = Timestamp::now();
        transport.post_inbound_at(group(), "visible", now.plus_secs(1));
        transport.post_inbound_at(group(), "too old", now.minus_hours(1));
        transport.post_inbound_at(GroupId::new("G2").unwrap(), "other group", now.plus_secs(1));

        let messages = transport.poll_since(&group(), now).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].raw_content, "visible");
    }

    #[tokio::test]
    async fn queued_errors_drain_before_messages() {
        let transport = MockChatTransport::new();
        let now = Timestamp::now();
        transport.push_poll_error(TransportError::network("down"));
        transport.post_inbound_at(group(), "after recovery", now.plus_secs(1));

        assert!(transport.poll_since(&group(), now).await.is_err());
        let messages = transport.poll_since(&group(), now).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(transport.poll_count(), 2);
    }
}
