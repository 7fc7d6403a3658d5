//! Log Sink Port - Best-effort persistence of relayed exchanges.
//!
//! Recording is fire-and-forget: implementations log and swallow their own
//! failures, which never propagate to the caller.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::domain::foundation::{ConversationId, CorrelationId, Timestamp};

/// One side of a relayed exchange: the outbound message, or the reply once
/// it arrives.
#[derive(Debug, Clone, Serialize)]
pub struct ExchangeRecord {
    /// When the exchange started.
    pub timestamp: Timestamp,
    /// Caller-supplied conversation identifier.
    pub conversation_id: ConversationId,
    /// Correlation id tagged onto the outbound message.
    pub correlation_id: CorrelationId,
    /// The human message, present on the outbound record.
    pub message: Option<String>,
    /// The extracted reply, present on the reply record.
    pub reply: Option<Value>,
}

impl ExchangeRecord {
    /// Record for the outbound half of an exchange.
    pub fn outbound(
        timestamp: Timestamp,
        conversation_id: ConversationId,
        correlation_id: CorrelationId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            conversation_id,
            correlation_id,
            message: Some(message.into()),
            reply: None,
        }
    }

    /// Record for the reply half of an exchange.
    pub fn reply(
        timestamp: Timestamp,
        conversation_id: ConversationId,
        correlation_id: CorrelationId,
        reply: Value,
    ) -> Self {
        Self {
            timestamp,
            conversation_id,
            correlation_id,
            message: None,
            reply: Some(reply),
        }
    }
}

/// Port for the optional exchange log collaborator.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Records an exchange. Must not fail the caller: implementations handle
    /// and swallow their own errors.
    async fn record(&self, record: ExchangeRecord);
}
