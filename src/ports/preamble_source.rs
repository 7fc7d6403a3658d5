//! Preamble Source Port - Supplies the prompt/instructions text blocks.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::correlation::Preamble;

/// Port for loading the preamble prepended to tagged messages.
///
/// Loaded per request so operators can edit the text blocks without a
/// restart.
#[async_trait]
pub trait PreambleSource: Send + Sync {
    /// Loads the current prompt and instructions.
    async fn load(&self) -> Result<Preamble, PreambleError>;
}

/// Preamble loading errors.
#[derive(Debug, Error)]
pub enum PreambleError {
    #[error("preamble file missing: {path}")]
    Missing {
        /// The configured path that was not found.
        path: String,
    },

    #[error("failed to read preamble: {0}")]
    Io(String),
}
