//! In-memory API key store.

use std::sync::RwLock;

use async_trait::async_trait;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::ports::ApiKeyValidator;

/// Holds the set of active API keys, seeded from configuration.
///
/// Lookups compare in constant time per candidate key. The length check
/// before the byte comparison is unavoidable; it only leaks key length.
#[derive(Debug, Default)]
pub struct InMemoryApiKeyStore {
    keys: RwLock<Vec<String>>,
}

impl InMemoryApiKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given keys. Empty entries are
    /// dropped.
    pub fn with_keys(keys: impl IntoIterator<Item = String>) -> Self {
        let keys = keys
            .into_iter()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .collect();
        Self {
            keys: RwLock::new(keys),
        }
    }

    /// Generates, registers, and returns a fresh key.
    pub fn generate(&self) -> String {
        let key = format!("ck_{}", Uuid::new_v4().simple());
        self.keys.write().unwrap().push(key.clone());
        key
    }

    /// Registers an externally-issued key.
    pub fn add(&self, key: impl Into<String>) {
        self.keys.write().unwrap().push(key.into());
    }

    /// Revokes a key. Unknown keys are a no-op.
    pub fn revoke(&self, key: &str) {
        self.keys.write().unwrap().retain(|known| known != key);
    }

    /// Number of active keys.
    pub fn len(&self) -> usize {
        self.keys.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.read().unwrap().is_empty()
    }
}

#[async_trait]
impl ApiKeyValidator for InMemoryApiKeyStore {
    async fn is_valid(&self, key: &str) -> bool {
        let keys = self.keys.read().unwrap();
        keys.iter().any(|known| {
            known.len() == key.len() && known.as_bytes().ct_eq(key.as_bytes()).into()
        })
    }
}
