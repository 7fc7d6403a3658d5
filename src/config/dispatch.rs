//! Dispatch queue configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Dispatch queue configuration (custom message sends)
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Bound on queued messages
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Minimum pause between consecutive sends, in seconds
    #[serde(default = "default_send_spacing")]
    pub send_spacing_secs: u64,
}

impl DispatchConfig {
    /// Validate dispatch configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.queue_capacity == 0 || self.queue_capacity > 1024 {
            return Err(ValidationError::InvalidQueueCapacity);
        }
        Ok(())
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            send_spacing_secs: default_send_spacing(),
        }
    }
}

fn default_queue_capacity() -> usize {
    64
}

fn default_send_spacing() -> u64 {
    15
}
