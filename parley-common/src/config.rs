use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ConfigError;

fn default_retry_delay_ms() -> u64 {
    100
}

fn default_interaction_timeout_ms() -> u64 {
    60_000
}

fn default_true() -> bool {
    true
}

fn default_mime_type() -> String {
    "audio/wav".to_string()
}

/// Tunables for the speech playback engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Pause before moving on after a fragment failed to play. Must be non-zero.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// How long a user gesture is assumed to keep audio playback unlocked
    #[serde(default = "default_interaction_timeout_ms")]
    pub interaction_timeout_ms: u64,
    /// Route to the "enable audio" prompt before playing when the last
    /// gesture is older than `interaction_timeout_ms`
    #[serde(default = "default_true")]
    pub preemptive_gate: bool,
    /// Skip a fragment that neither ends nor errors within this time.
    /// None = wait forever.
    #[serde(default)]
    pub session_timeout_ms: Option<u64>,
    /// MIME type the producer encodes fragments with
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: default_retry_delay_ms(),
            interaction_timeout_ms: default_interaction_timeout_ms(),
            preemptive_gate: true,
            session_timeout_ms: None,
            mime_type: default_mime_type(),
        }
    }
}

impl PlayerConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_delay_ms == 0 {
            return Err(ConfigError::Config(
                "retry_delay_ms must be greater than zero".to_string(),
            ));
        }
        if self.session_timeout_ms == Some(0) {
            return Err(ConfigError::Config(
                "session_timeout_ms must be greater than zero when set".to_string(),
            ));
        }
        if self.mime_type.trim().is_empty() {
            return Err(ConfigError::Config("mime_type is empty".to_string()));
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn session_timeout(&self) -> Option<Duration> {
        self.session_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = PlayerConfig::default();
        assert_eq!(c.retry_delay(), Duration::from_millis(100));
        assert_eq!(c.interaction_timeout_ms, 60_000);
        assert!(c.preemptive_gate);
        assert_eq!(c.session_timeout(), None);
        assert_eq!(c.mime_type, "audio/wav");
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let c = PlayerConfig::from_json(r#"{"session_timeout_ms": 30000}"#).unwrap();
        assert_eq!(c.session_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(c.retry_delay_ms, 100);
    }

    #[test]
    fn test_zero_retry_delay_rejected() {
        let err = PlayerConfig::from_json(r#"{"retry_delay_ms": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = PlayerConfig::from_json("{").unwrap_err();
        assert!(matches!(err, ConfigError::Serialization(_)));
    }
}
