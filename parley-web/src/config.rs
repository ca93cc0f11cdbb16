//! Client configuration.
//!
//! The host page may embed a JSON object in
//! `<script id="parley-config" type="application/json">`. Anything missing
//! falls back to the defaults: same-origin backend, general scenario, default
//! player tunables.

use parley_common::{ConfigError, PlayerConfig, Scenario};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const CONFIG_ELEMENT_ID: &str = "parley-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Backend origin, empty for same-origin
    pub api_base: String,
    /// Scenario a new conversation starts in
    pub scenario: Scenario,
    /// Voice the tutor's replies are synthesized with
    pub voice: String,
    /// Language code recordings are transcribed in
    pub language: String,
    pub player: PlayerConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            scenario: Scenario::default(),
            voice: "af_heart.pt".to_string(),
            language: "en".to_string(),
            player: PlayerConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Serialization(e.to_string()))?;
        if config.voice.trim().is_empty() {
            return Err(ConfigError::Config("voice is empty".to_string()));
        }
        config.player.validate()?;
        Ok(config)
    }

    /// Read the embedded config from the page, or use defaults.
    pub fn load() -> Self {
        let embedded = web_sys_x::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(CONFIG_ELEMENT_ID))
            .and_then(|el| el.text_content());

        let Some(json) = embedded else {
            return Self::default();
        };
        match Self::from_json(&json) {
            Ok(config) => {
                info!("Loaded client config (scenario: {})", config.scenario.as_str());
                config
            }
            Err(e) => {
                warn!("Ignoring embedded client config: {}", e);
                Self::default()
            }
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }

    /// Server-sent speech events
    pub fn stream_url(&self) -> String {
        self.endpoint("/api/tts-stream")
    }

    pub fn chat_url(&self) -> String {
        self.endpoint("/api/llm")
    }

    pub fn transcribe_url(&self) -> String {
        self.endpoint("/api/stt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_same_origin() {
        let config = ClientConfig::default();
        assert_eq!(config.stream_url(), "/api/tts-stream");
        assert_eq!(config.chat_url(), "/api/llm");
        assert_eq!(config.transcribe_url(), "/api/stt");
        assert_eq!(config.scenario, Scenario::General);
        assert_eq!(config.voice, "af_heart.pt");
        assert_eq!(config.language, "en");
    }

    #[test]
    fn test_from_json_partial() {
        let config = ClientConfig::from_json(
            r#"{"api_base": "http://localhost:8000/", "scenario": "shopping"}"#,
        )
        .unwrap();
        assert_eq!(config.stream_url(), "http://localhost:8000/api/tts-stream");
        assert_eq!(config.scenario, Scenario::Shopping);
        assert_eq!(config.player, PlayerConfig::default());
        assert_eq!(config.voice, "af_heart.pt");
    }

    #[test]
    fn test_from_json_overrides_voice_and_language() {
        let config =
            ClientConfig::from_json(r#"{"voice": "bf_emma.pt", "language": "fr"}"#).unwrap();
        assert_eq!(config.voice, "bf_emma.pt");
        assert_eq!(config.language, "fr");
    }

    #[test]
    fn test_from_json_rejects_empty_voice() {
        let err = ClientConfig::from_json(r#"{"voice": " "}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_from_json_rejects_invalid_player_config() {
        let err = ClientConfig::from_json(r#"{"player": {"retry_delay_ms": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = ClientConfig::from_json("not json").unwrap_err();
        assert!(matches!(err, ConfigError::Serialization(_)));
    }
}
