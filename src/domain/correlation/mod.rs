//! Correlation engine: tagged sends and polled waits for correlated replies.

mod engine;
mod message;
mod wait;

pub use engine::{
    CorrelationEngine, CorrelationError, EngineConfig, DEFAULT_POLL_INTERVAL,
    DEFAULT_REPLY_TIMEOUT,
};
pub use message::{compose_tagged_body, InboundMessage, OutboundMessage, Preamble};
pub use wait::{CorrelationWait, WaitState};
