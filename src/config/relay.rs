//! Relay configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Relay configuration (target group, preamble files, wait tuning)
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Group the AI-assisted exchanges are relayed into
    pub group_id: String,

    /// Path of the prompt text block
    #[serde(default = "default_prompt_path")]
    pub prompt_path: String,

    /// Path of the instructions text block
    #[serde(default = "default_instructions_path")]
    pub instructions_path: String,

    /// Hard deadline for a correlated wait, in seconds
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_secs: u64,

    /// Pause between poll cycles, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Record relayed exchanges to the log sink
    #[serde(default)]
    pub log_exchanges: bool,
}

impl RelayConfig {
    /// Validate relay configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.group_id.is_empty() {
            return Err(ValidationError::MissingRequired("relay.group_id"));
        }
        if self.reply_timeout_secs == 0 || self.reply_timeout_secs > 600 {
            return Err(ValidationError::InvalidReplyTimeout);
        }
        if self.poll_interval_ms < 100 || self.poll_interval_ms > 10_000 {
            return Err(ValidationError::InvalidPollInterval);
        }
        Ok(())
    }
}

fn default_prompt_path() -> String {
    "prompt.txt".to_string()
}

fn default_instructions_path() -> String {
    "instructions.txt".to_string()
}

fn default_reply_timeout() -> u64 {
    120
}

fn default_poll_interval() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RelayConfig {
        RelayConfig {
            group_id: "G1".to_string(),
            prompt_path: default_prompt_path(),
            instructions_path: default_instructions_path(),
            reply_timeout_secs: default_reply_timeout(),
            poll_interval_ms: default_poll_interval(),
            log_exchanges: false,
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_missing_group_id() {
        let mut c = config();
        c.group_id = String::new();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_invalid_reply_timeout() {
        let mut c = config();
        c.reply_timeout_secs = 0;
        assert!(c.validate().is_err());
        c.reply_timeout_secs = 700;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_invalid_poll_interval() {
        let mut c = config();
        c.poll_interval_ms = 50;
        assert!(c.validate().is_err());
        c.poll_interval_ms = 20_000;
        assert!(c.validate().is_err());
    }
}
