//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CHAT_COURIER_` prefix and nested values use underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use chat_courier::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod dispatch;
mod error;
mod relay;
mod server;
mod transport;

pub use dispatch::DispatchConfig;
pub use error::{ConfigError, ValidationError};
pub use relay::RelayConfig;
pub use server::{Environment, ServerConfig};
pub use transport::TransportConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Contains all configuration sections for the relay. Load using
/// [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat backend configuration (connection, credentials, session)
    pub transport: TransportConfig,

    /// Relay configuration (target group, preamble files, wait tuning)
    pub relay: RelayConfig,

    /// Dispatch queue configuration (custom message sends)
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `CHAT_COURIER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CHAT_COURIER__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CHAT_COURIER__TRANSPORT__BASE_URL=...` -> `transport.base_url = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHAT_COURIER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.transport.validate()?;
        self.relay.validate()?;
        self.dispatch.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    /// Helper to set environment variables for testing
    /// Uses double underscores to separate nested config values
    fn set_minimal_env() {
        env::set_var("CHAT_COURIER__TRANSPORT__BASE_URL", "https://chat.example.com");
        env::set_var("CHAT_COURIER__TRANSPORT__USERNAME", "relay-bot");
        env::set_var("CHAT_COURIER__TRANSPORT__PASSWORD", "hunter2");
        env::set_var("CHAT_COURIER__RELAY__GROUP_ID", "G1");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        env::remove_var("CHAT_COURIER__TRANSPORT__BASE_URL");
        env::remove_var("CHAT_COURIER__TRANSPORT__USERNAME");
        env::remove_var("CHAT_COURIER__TRANSPORT__PASSWORD");
        env::remove_var("CHAT_COURIER__RELAY__GROUP_ID");
        env::remove_var("CHAT_COURIER__SERVER__PORT");
        env::remove_var("CHAT_COURIER__SERVER__ENVIRONMENT");
        env::remove_var("CHAT_COURIER__RELAY__REPLY_TIMEOUT_SECS");
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.transport.base_url, "https://chat.example.com");
        assert_eq!(config.relay.group_id, "G1");
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok());
        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_and_relay_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.relay.reply_timeout_secs, 120);
        assert_eq!(config.relay.poll_interval_ms, 1000);
        assert_eq!(config.dispatch.queue_capacity, 64);
    }

    #[test]
    fn test_custom_reply_timeout() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CHAT_COURIER__RELAY__REPLY_TIMEOUT_SECS", "60");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.relay.reply_timeout_secs, 60);
    }

    #[test]
    fn test_is_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("CHAT_COURIER__SERVER__ENVIRONMENT", "production");
        env::set_var("CHAT_COURIER__SERVER__API_KEYS", "key-one");
        let result = AppConfig::load();
        env::remove_var("CHAT_COURIER__SERVER__API_KEYS");
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert!(config.validate().is_ok());
    }
}
