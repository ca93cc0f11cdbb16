//! UI state stores

use dioxus::prelude::*;
use parley_common::{ChatMessage, PlayerSnapshot, PlayerStatus, Scenario, Transcript};

/// What the speech pipeline shows the user.
#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct SpeechUiState {
    pub status: PlayerStatus,
    /// Fragments waiting, including the one playing
    pub queued: usize,
    pub current_seq: Option<u64>,
    /// Whether the "enable audio" button is shown
    pub prompt_visible: bool,
    pub stream_connected: bool,
    /// Last error reported by the speech stream. Cleared on reconnect.
    pub stream_error: Option<String>,
}

impl SpeechUiState {
    pub fn status_text(&self) -> String {
        if let Some(e) = &self.stream_error {
            return format!("Speech stream error: {e}");
        }
        match &self.status {
            PlayerStatus::Idle if !self.stream_connected => "Connecting to speech...".to_string(),
            PlayerStatus::Idle => "Ready".to_string(),
            PlayerStatus::Playing => match self.queued {
                0 | 1 => "Speaking".to_string(),
                n => format!("Speaking ({} more queued)", n - 1),
            },
            PlayerStatus::Recovering => "Skipping a broken fragment".to_string(),
            PlayerStatus::WaitingForPermission => "Click \"Enable audio\" to hear the tutor".to_string(),
            PlayerStatus::Unavailable(reason) => format!("Audio unavailable: {reason}"),
        }
    }
}

/// Copy an engine snapshot into the store
pub fn apply_snapshot(store: Store<SpeechUiState>, snapshot: PlayerSnapshot) {
    store.status().set(snapshot.status);
    store.queued().set(snapshot.queued);
    store.current_seq().set(snapshot.current_seq);
}

/// Conversation state for the chat page.
#[derive(Clone, Debug, Default, PartialEq, Store)]
pub struct ChatUiState {
    pub conversation_id: String,
    pub scenario: Scenario,
    pub transcript: Transcript,
    pub draft: String,
    pub sending: bool,
    /// A recording is being turned into text
    pub transcribing: bool,
    pub error: Option<String>,
}

/// A user turn that has been added to the transcript and still needs a reply
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTurn {
    pub message: String,
    pub conversation_id: String,
    /// History before this turn
    pub context: Vec<ChatMessage>,
    pub scenario: Scenario,
}

impl ChatUiState {
    pub fn is_busy(&self) -> bool {
        self.sending || self.transcribing
    }

    /// Add `message` as the user's turn. Blank messages and turns started
    /// while another request is in flight are refused.
    pub fn begin_turn(&mut self, message: &str) -> Option<PendingTurn> {
        let message = message.trim();
        if message.is_empty() || self.is_busy() {
            return None;
        }

        // The backend merges the new message into the context itself.
        let context = self.transcript.context();
        self.transcript.push_user(message);
        self.sending = true;
        self.error = None;

        Some(PendingTurn {
            message: message.to_string(),
            conversation_id: self.conversation_id.clone(),
            context,
            scenario: self.scenario,
        })
    }

    /// Apply the reply to a turn sent for `conversation_id`. Replies for a
    /// conversation that has been reset since are dropped.
    pub fn finish_turn(&mut self, conversation_id: &str, reply: Result<String, String>) -> bool {
        if self.conversation_id != conversation_id {
            return false;
        }
        match reply {
            Ok(text) => self.transcript.push_assistant(text),
            Err(e) => self.error = Some(e),
        }
        self.sending = false;
        true
    }

    /// Start transcribing a recording. Refused while busy.
    pub fn begin_transcription(&mut self) -> Option<String> {
        if self.is_busy() {
            return None;
        }
        self.transcribing = true;
        self.error = None;
        Some(self.conversation_id.clone())
    }

    /// Apply a transcription result. Returns the text to send as the user's
    /// turn, or None when it failed, was empty or the conversation moved on.
    pub fn finish_transcription(
        &mut self,
        conversation_id: &str,
        result: Result<String, String>,
    ) -> Option<String> {
        if self.conversation_id != conversation_id {
            return None;
        }
        self.transcribing = false;
        match result {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                self.error = Some("No speech recognized in the recording.".to_string());
                None
            }
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }

    /// Forget the conversation and start a new one under `conversation_id`.
    pub fn reset(&mut self, conversation_id: String) {
        self.conversation_id = conversation_id;
        self.transcript.clear();
        self.draft.clear();
        self.sending = false;
        self.transcribing = false;
        self.error = None;
    }
}
