//! API Key Validator Port - Guards the relay's HTTP surface.

use async_trait::async_trait;

/// Port for API key validation.
///
/// Key issuance and storage live with the adapter; the HTTP middleware only
/// asks one question.
#[async_trait]
pub trait ApiKeyValidator: Send + Sync {
    /// Returns true when `key` is a known, active API key.
    async fn is_valid(&self, key: &str) -> bool;
}
