//! Events of the speech stream (`GET /api/tts-stream`).
//!
//! The browser's `EventSource` already splits the wire framing into
//! `(event name, data)` pairs; this module turns those pairs into typed
//! messages. The server sends:
//!
//! - `connected` `{"status": "connected"}` once the stream is open
//! - `audio` `{"audio": "<base64 wav>"}` for every synthesized fragment
//! - `ping` `{}` as keep-alive while idle
//! - `error` `{"error": "..."}` when synthesis fails
//! - `close` `{"status": "closed"}` right before the server ends the stream

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamMessage {
    Connected,
    /// One base64-encoded speech fragment
    Audio(String),
    Ping,
    Error(String),
    Closed,
}

#[derive(Deserialize)]
struct AudioPayload {
    audio: String,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
}

impl StreamMessage {
    /// Parse one event. Unknown event names yield `Ok(None)`.
    pub fn parse(event: &str, data: &str) -> Result<Option<Self>, serde_json::Error> {
        let msg = match event {
            "connected" => Self::Connected,
            "audio" => {
                let payload: AudioPayload = serde_json::from_str(data)?;
                Self::Audio(payload.audio)
            }
            "ping" => Self::Ping,
            "error" => {
                let payload: ErrorPayload = serde_json::from_str(data)?;
                Self::Error(
                    payload
                        .error
                        .unwrap_or_else(|| "Unknown stream error".to_string()),
                )
            }
            "close" => Self::Closed,
            _ => return Ok(None),
        };
        Ok(Some(msg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_event() {
        let msg = StreamMessage::parse("audio", r#"{"audio": "UklGRg=="}"#).unwrap();
        assert_eq!(msg, Some(StreamMessage::Audio("UklGRg==".into())));
    }

    #[test]
    fn test_audio_without_field_is_error() {
        assert!(StreamMessage::parse("audio", "{}").is_err());
    }

    #[test]
    fn test_control_events() {
        assert_eq!(
            StreamMessage::parse("connected", r#"{"status": "connected"}"#).unwrap(),
            Some(StreamMessage::Connected)
        );
        assert_eq!(
            StreamMessage::parse("ping", "{}").unwrap(),
            Some(StreamMessage::Ping)
        );
        assert_eq!(
            StreamMessage::parse("close", r#"{"status": "closed"}"#).unwrap(),
            Some(StreamMessage::Closed)
        );
    }

    #[test]
    fn test_error_event() {
        let msg =
            StreamMessage::parse("error", r#"{"error": "TTS manager not initialized"}"#).unwrap();
        assert_eq!(
            msg,
            Some(StreamMessage::Error("TTS manager not initialized".into()))
        );
    }

    #[test]
    fn test_unknown_event_ignored() {
        assert_eq!(StreamMessage::parse("message", "whatever").unwrap(), None);
    }
}
