use base64::{engine::general_purpose::STANDARD, Engine};
use parley_common::{ChatMessage, Scenario};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/llm`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub conversation_id: &'a str,
    pub context: Vec<ChatMessage>,
    pub scenario: Scenario,
    /// Speech synthesis voice for the reply
    pub voice: &'a str,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: String,
    pub conversation_id: Option<String>,
}

/// Send one user turn. The tutor's spoken reply arrives separately on the
/// speech stream; this only returns its text.
pub async fn send_chat(url: &str, request: &ChatRequest<'_>) -> Result<ChatResponse, String> {
    let resp = reqwest::Client::new()
        .post(url)
        .json(request)
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!("Server error: {}", resp.status()));
    }

    let body: ChatResponse = resp.json().await.map_err(|e| format!("Parse error: {e}"))?;
    if !body.success {
        return Err("The tutor could not answer.".to_string());
    }
    Ok(body)
}

/// Body of `POST /api/stt`
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TranscriptionRequest<'a> {
    pub audio_base64: String,
    pub language: &'a str,
}

impl<'a> TranscriptionRequest<'a> {
    pub fn new(audio: &[u8], language: &'a str) -> Self {
        Self {
            audio_base64: STANDARD.encode(audio),
            language,
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct TranscriptionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub text: String,
    pub language: Option<String>,
}

/// Turn a recorded clip into text.
pub async fn transcribe(url: &str, audio: &[u8], language: &str) -> Result<String, String> {
    if audio.is_empty() {
        return Err("The recording is empty.".to_string());
    }

    let resp = reqwest::Client::new()
        .post(url)
        .json(&TranscriptionRequest::new(audio, language))
        .send()
        .await
        .map_err(|e| format!("Network error: {e}"))?;

    if !resp.status().is_success() {
        return Err(format!("Server error: {}", resp.status()));
    }

    let body: TranscriptionResponse =
        resp.json().await.map_err(|e| format!("Parse error: {e}"))?;
    if !body.success {
        return Err("The recording could not be transcribed.".to_string());
    }
    Ok(body.text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_common::Role;

    #[test]
    fn test_request_shape() {
        let request = ChatRequest {
            message: "Bonjour",
            conversation_id: "abc",
            context: vec![ChatMessage {
                role: Role::Assistant,
                content: "Salut".into(),
            }],
            scenario: Scenario::Restaurant,
            voice: "af_heart.pt",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "Bonjour");
        assert_eq!(json["scenario"], "restaurant");
        assert_eq!(json["voice"], "af_heart.pt");
        assert_eq!(json["context"][0]["role"], "assistant");
    }

    #[test]
    fn test_response_parses_backend_reply() {
        let body: ChatResponse = serde_json::from_str(
            r#"{"success": true, "response": "Très bien !", "conversation_id": "abc"}"#,
        )
        .unwrap();
        assert!(body.success);
        assert_eq!(body.response, "Très bien !");
        assert_eq!(body.conversation_id.as_deref(), Some("abc"));
    }

    #[test]
    fn test_transcription_request_encodes_audio() {
        let request = TranscriptionRequest::new(b"RIFF", "fr");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["audio_base64"], "UklGRg==");
        assert_eq!(json["language"], "fr");
    }

    #[test]
    fn test_transcription_response_parses_backend_reply() {
        let body: TranscriptionResponse = serde_json::from_str(
            r#"{"success": true, "text": " Je voudrais un café. ", "language": "fr"}"#,
        )
        .unwrap();
        assert!(body.success);
        assert_eq!(body.text.trim(), "Je voudrais un café.");
        assert_eq!(body.language.as_deref(), Some("fr"));
    }
}
