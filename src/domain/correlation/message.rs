//! Outbound and inbound message value objects, and the tagged-body composer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, CorrelationId, GroupId, Timestamp};

/// Prompt and instruction text blocks prepended to every tagged message.
///
/// Both are opaque text supplied by configuration; the engine only cares
/// about concatenation order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    prompt: String,
    instructions: String,
}

impl Preamble {
    /// Creates a preamble from its two text blocks.
    pub fn new(prompt: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            instructions: instructions.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }
}

/// Composes the outbound body for an AI-assisted message.
///
/// The concatenation order is part of the wire contract with the downstream
/// responder and must not change: preamble lines, then the correlation id,
/// then the conversation id, then the human message, each on its own line.
pub fn compose_tagged_body(
    preamble: &Preamble,
    correlation_id: CorrelationId,
    conversation_id: &ConversationId,
    human_message: &str,
) -> String {
    format!(
        "{}\n{}\nid: {}\nsession_id: {}\nmessage: {}",
        preamble.prompt(),
        preamble.instructions(),
        correlation_id,
        conversation_id,
        human_message
    )
}

/// A message accepted for sending, immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundMessage {
    group_id: GroupId,
    body: String,
    correlation_id: CorrelationId,
    enqueued_at: Timestamp,
}

impl OutboundMessage {
    /// Creates an outbound message with a fresh enqueue timestamp.
    pub fn new(group_id: GroupId, body: impl Into<String>, correlation_id: CorrelationId) -> Self {
        Self {
            group_id,
            body: body.into(),
            correlation_id,
            enqueued_at: Timestamp::now(),
        }
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    pub fn enqueued_at(&self) -> Timestamp {
        self.enqueued_at
    }
}

/// A message observed on the transport. Transient: the core never persists
/// these, it only extracts and matches them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Chat the message was observed in.
    pub group_id: GroupId,
    /// Raw content exactly as the transport delivered it.
    pub raw_content: String,
    /// Arrival time, normalized to UTC by the transport adapter.
    pub received_at: Timestamp,
}

impl InboundMessage {
    /// Creates an inbound message.
    pub fn new(group_id: GroupId, raw_content: impl Into<String>, received_at: Timestamp) -> Self {
        Self {
            group_id,
            raw_content: raw_content.into(),
            received_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tagged_body_preserves_wire_order() {
        let preamble = Preamble::new("You are a relay responder.", "Reply with JSON only.");
        let correlation_id = CorrelationId::new();
        let conversation_id = ConversationId::new("S1").unwrap();

        let body = compose_tagged_body(&preamble, correlation_id, &conversation_id, "hi");

        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines[0], "You are a relay responder.");
        assert_eq!(lines[1], "Reply with JSON only.");
        assert_eq!(lines[2], format!("id: {correlation_id}"));
        assert_eq!(lines[3], "session_id: S1");
        assert_eq!(lines[4], "message: hi");
    }

    #[test]
    fn tagged_body_contains_the_correlation_id() {
        let preamble = Preamble::new("p", "i");
        let correlation_id = CorrelationId::new();
        let conversation_id = ConversationId::new("S1").unwrap();

        let body = compose_tagged_body(&preamble, correlation_id, &conversation_id, "hello");
        assert!(body.contains(&format!("id: {correlation_id}")));
    }

    #[test]
    fn outbound_message_is_immutable_snapshot() {
        let group = GroupId::new("G1").unwrap();
        let id = CorrelationId::new();
        let message = OutboundMessage::new(group.clone(), "body", id);

        assert_eq!(message.group_id(), &group);
        assert_eq!(message.body(), "body");
        assert_eq!(message.correlation_id(), id);
    }
}
