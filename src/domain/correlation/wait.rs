//! Per-wait state machine for an outstanding correlated reply.

use crate::domain::extraction::ExtractedPayload;
use crate::domain::foundation::{CorrelationId, GroupId, Timestamp};

/// Resolution state of a wait. `Pending` transitions to exactly one of the
/// terminal states; terminal states are final.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitState {
    /// Still polling for a matching reply.
    Pending,
    /// A reply carrying the expected correlation id arrived.
    Matched(ExtractedPayload),
    /// The deadline passed without a matching reply.
    TimedOut,
}

/// One outstanding wait for a correlated reply.
///
/// Owned and mutated only by the poll loop that created it; discarded once
/// resolved. Exactly one wait exists per outstanding correlation id.
#[derive(Debug, Clone)]
pub struct CorrelationWait {
    correlation_id: CorrelationId,
    group_id: GroupId,
    deadline: Timestamp,
    state: WaitState,
}

impl CorrelationWait {
    /// Creates a pending wait with the given deadline.
    pub fn new(correlation_id: CorrelationId, group_id: GroupId, deadline: Timestamp) -> Self {
        Self {
            correlation_id,
            group_id,
            deadline,
            state: WaitState::Pending,
        }
    }

    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn deadline(&self) -> Timestamp {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, WaitState::Pending)
    }

    pub fn state(&self) -> &WaitState {
        &self.state
    }

    /// Offers an extracted payload to this wait.
    ///
    /// Transitions to `Matched` and returns `true` only when the wait is
    /// still pending and the payload's correlation field equals the expected
    /// id. Non-matching payloads and offers against a resolved wait are
    /// dropped.
    pub fn observe(&mut self, payload: ExtractedPayload) -> bool {
        if !self.is_pending() {
            return false;
        }
        let matches = payload
            .reply_id()
            .map(|reply_id| self.correlation_id.matches(reply_id))
            .unwrap_or(false);
        if matches {
            self.state = WaitState::Matched(payload);
        }
        matches
    }

    /// Transitions a pending wait to `TimedOut`. No-op on resolved waits.
    pub fn time_out(&mut self) {
        if self.is_pending() {
            self.state = WaitState::TimedOut;
        }
    }

    /// Matched payload, if the wait resolved with one.
    pub fn matched(&self) -> Option<&ExtractedPayload> {
        match &self.state {
            WaitState::Matched(payload) => Some(payload),
            _ => None,
        }
    }

    /// Consumes the wait, returning the matched payload if there is one.
    pub fn into_matched(self) -> Option<ExtractedPayload> {
        match self.state {
            WaitState::Matched(payload) => Some(payload),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extraction::ContentExtractor;

    fn payload_for(id: &CorrelationId) -> ExtractedPayload {
        ContentExtractor::new()
            .extract(&format!(r#"{{"reply_id": "{id}", "text": "hello"}}"#))
            .unwrap()
    }

    fn wait_for(id: CorrelationId) -> CorrelationWait {
        CorrelationWait::new(id, GroupId::new("G1").unwrap(), Timestamp::now().plus_secs(120))
    }

    #[test]
    fn starts_pending() {
        let wait = wait_for(CorrelationId::new());
        assert!(wait.is_pending());
    }

    #[test]
    fn matching_payload_resolves_the_wait() {
        let id = CorrelationId::new();
        let mut wait = wait_for(id);

        assert!(wait.observe(payload_for(&id)));
        assert!(!wait.is_pending());
        assert!(wait.into_matched().is_some());
    }

    #[test]
    fn non_matching_payload_is_dropped() {
        let mut wait = wait_for(CorrelationId::new());

        assert!(!wait.observe(payload_for(&CorrelationId::new())));
        assert!(wait.is_pending());
    }

    #[test]
    fn payload_without_reply_id_is_dropped() {
        let mut wait = wait_for(CorrelationId::new());
        let payload = ContentExtractor::new().extract(r#"{"text": "hi"}"#).unwrap();

        assert!(!wait.observe(payload));
        assert!(wait.is_pending());
    }

    #[test]
    fn timeout_is_terminal() {
        let id = CorrelationId::new();
        let mut wait = wait_for(id);
        wait.time_out();

        assert_eq!(wait.state(), &WaitState::TimedOut);
        // A late match must not resurrect a timed-out wait.
        assert!(!wait.observe(payload_for(&id)));
        assert_eq!(wait.state(), &WaitState::TimedOut);
    }

    #[test]
    fn matched_is_terminal() {
        let id = CorrelationId::new();
        let mut wait = wait_for(id);
        assert!(wait.observe(payload_for(&id)));

        // Neither a second match nor a timeout may change a resolved wait.
        assert!(!wait.observe(payload_for(&id)));
        wait.time_out();
        assert!(matches!(wait.state(), WaitState::Matched(_)));
    }
}
