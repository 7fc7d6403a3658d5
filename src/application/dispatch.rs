//! Background dispatch queue for fire-and-forget sends.
//!
//! Custom (untagged) messages go through here instead of straight to the
//! transport so that bursts are smoothed to a minimum inter-send spacing,
//! which keeps the chat backend's rate limiter quiet.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::correlation::OutboundMessage;
use crate::ports::ChatTransport;

/// Default bound on queued messages.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Default minimum pause between consecutive sends.
pub const DEFAULT_SEND_SPACING: Duration = Duration::from_secs(15);

/// Dispatch queue errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The bounded queue is full; the caller should back off and retry.
    #[error("dispatch queue is full")]
    QueueFull,

    /// The worker task has stopped; no further sends are possible.
    #[error("dispatch worker stopped")]
    WorkerStopped,
}

/// Handle to the single background send worker.
///
/// Cloneable; all clones feed the same queue. Enqueueing never blocks: a
/// full queue is surfaced to the caller instead of applying backpressure
/// inside a request handler.
#[derive(Clone)]
pub struct DispatchQueue {
    sender: mpsc::Sender<OutboundMessage>,
}

impl DispatchQueue {
    /// Spawns the worker task and returns the queue handle.
    ///
    /// The worker drains messages in FIFO order, sending each and then
    /// pausing for `spacing`. Send failures are logged and the message is
    /// dropped; there is no redelivery for fire-and-forget sends.
    pub fn spawn(transport: Arc<dyn ChatTransport>, capacity: usize, spacing: Duration) -> Self {
        let (sender, mut receiver) = mpsc::channel::<OutboundMessage>(capacity);

        tokio::spawn(async move {
            while let Some(message) = receiver.recv().await {
                match transport.send(message.group_id(), message.body()).await {
                    Ok(()) => {
                        tracing::info!(
                            group_id = %message.group_id(),
                            correlation_id = %message.correlation_id(),
                            "dispatched queued message"
                        );
                    }
                    Err(err) => {
                        tracing::error!(
                            error = %err,
                            group_id = %message.group_id(),
                            "failed to dispatch queued message, dropping it"
                        );
                    }
                }
                tokio::time::sleep(spacing).await;
            }
            tracing::debug!("dispatch worker shutting down");
        });

        Self { sender }
    }

    /// Enqueues a message for background sending.
    pub fn enqueue(&self, message: OutboundMessage) -> Result<(), DispatchError> {
        self.sender.try_send(message).map_err(|err| match err {
            TrySendError::Full(_) => DispatchError::QueueFull,
            TrySendError::Closed(_) => DispatchError::WorkerStopped,
        })
    }
}
