//! Credential provider backed by configuration and a session file on disk.

use std::path::PathBuf;

use async_trait::async_trait;
use secrecy::Secret;

use crate::ports::{CredentialError, CredentialProvider, Credentials};

/// Serves credentials from configuration and persists the session blob to a
/// file so restarts can skip the login round-trip.
pub struct FileCredentialProvider {
    credentials: Credentials,
    session_file: PathBuf,
}

impl FileCredentialProvider {
    /// Creates a provider with the given credentials and session file path.
    pub fn new(
        username: impl Into<String>,
        password: Secret<String>,
        session_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            credentials: Credentials::new(username, password),
            session_file: session_file.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for FileCredentialProvider {
    async fn credentials(&self) -> Result<Credentials, CredentialError> {
        Ok(self.credentials.clone())
    }

    async fn load_session(&self) -> Result<Option<String>, CredentialError> {
        match tokio::fs::read_to_string(&self.session_file).await {
            Ok(blob) => {
                let blob = blob.trim().to_string();
                if blob.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(blob))
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(CredentialError::Storage(format!(
                "failed to read {}: {err}",
                self.session_file.display()
            ))),
        }
    }

    async fn store_session(&self, blob: &str) -> Result<(), CredentialError> {
        if let Some(parent) = self.session_file.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|err| {
                    CredentialError::Storage(format!(
                        "failed to create {}: {err}",
                        parent.display()
                    ))
                })?;
            }
        }
        tokio::fs::write(&self.session_file, blob)
            .await
            .map_err(|err| {
                CredentialError::Storage(format!(
                    "failed to write {}: {err}",
                    self.session_file.display()
                ))
            })
    }
}
