//! Exchange log sinks.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{ExchangeRecord, LogSink};

/// Emits each exchange record as a structured tracing event.
///
/// The default sink when exchange logging is enabled without an external
/// store: records land in the process log stream and whatever collector is
/// attached to it.
#[derive(Debug, Default)]
pub struct TracingLogSink;

impl TracingLogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LogSink for TracingLogSink {
    async fn record(&self, record: ExchangeRecord) {
        match serde_json::to_string(&record) {
            Ok(json) => {
                tracing::info!(target: "exchange_log", exchange = %json, "exchange recorded")
            }
            Err(err) => tracing::warn!(error = %err, "failed to serialize exchange record"),
        }
    }
}

/// Drops every record. Used when exchange logging is disabled.
#[derive(Debug, Default)]
pub struct NoopLogSink;

impl NoopLogSink {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LogSink for NoopLogSink {
    async fn record(&self, _record: ExchangeRecord) {}
}

/// Collects records in memory for assertions in tests.
#[derive(Debug, Default)]
pub struct InMemoryLogSink {
    records: Mutex<Vec<ExchangeRecord>>,
}

impl InMemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ExchangeRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogSink for InMemoryLogSink {
    async fn record(&self, record: ExchangeRecord) {
        self.records.lock().unwrap().push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ConversationId, CorrelationId, Timestamp};

    #[tokio::test]
    async fn in_memory_sink_collects_in_order() {
        let sink = InMemoryLogSink::new();
        let conversation = ConversationId::new("S1").unwrap();
        let id = CorrelationId::new();

        sink.record(ExchangeRecord::outbound(
            Timestamp::now(),
            conversation.clone(),
            id,
            "hi",
        ))
        .await;
        sink.record(ExchangeRecord::reply(
            Timestamp::now(),
            conversation,
            id,
            serde_json::json!({"text": "hello"}),
        ))
        .await;

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message.as_deref(), Some("hi"));
        assert!(records[0].reply.is_none());
        assert!(records[1].message.is_none());
        assert!(records[1].reply.is_some());
    }
}
