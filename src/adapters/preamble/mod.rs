//! File-backed preamble source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::correlation::Preamble;
use crate::ports::{PreambleError, PreambleSource};

/// Loads the prompt and instructions from two text files.
///
/// Files are read on every load so operators can edit the text blocks
/// without a restart. Trailing newlines are trimmed; interior formatting is
/// preserved.
pub struct FilePreambleSource {
    prompt_path: PathBuf,
    instructions_path: PathBuf,
}

impl FilePreambleSource {
    /// Creates a source reading from the two given paths.
    pub fn new(prompt_path: impl Into<PathBuf>, instructions_path: impl Into<PathBuf>) -> Self {
        Self {
            prompt_path: prompt_path.into(),
            instructions_path: instructions_path.into(),
        }
    }

    async fn read_block(path: &Path) -> Result<String, PreambleError> {
        match tokio::fs::read_to_string(path).await {
            Ok(text) => Ok(text.trim_end().to_string()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(PreambleError::Missing {
                path: path.display().to_string(),
            }),
            Err(err) => Err(PreambleError::Io(format!(
                "{}: {err}",
                path.display()
            ))),
        }
    }
}

#[async_trait]
impl PreambleSource for FilePreambleSource {
    async fn load(&self) -> Result<Preamble, PreambleError> {
        let prompt = Self::read_block(&self.prompt_path).await?;
        let instructions = Self::read_block(&self.instructions_path).await?;
        Ok(Preamble::new(prompt, instructions))
    }
}

/// Serves a fixed preamble. Used in tests and as a fallback when no files
/// are configured.
pub struct StaticPreambleSource {
    preamble: Preamble,
}

impl StaticPreambleSource {
    pub fn new(preamble: Preamble) -> Self {
        Self { preamble }
    }
}

#[async_trait]
impl PreambleSource for StaticPreambleSource {
    async fn load(&self) -> Result<Preamble, PreambleError> {
        Ok(self.preamble.clone())
    }
}
