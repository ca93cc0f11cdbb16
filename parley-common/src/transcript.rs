//! Chat transcript shown next to the speech player.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into());
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into());
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// History to send with the next request: consecutive messages from the
    /// same role are merged into one, newline separated.
    pub fn context(&self) -> Vec<ChatMessage> {
        let mut out: Vec<ChatMessage> = Vec::with_capacity(self.messages.len());
        for msg in &self.messages {
            match out.last_mut() {
                Some(last) if last.role == msg.role => {
                    last.content.push('\n');
                    last.content.push_str(&msg.content);
                }
                _ => out.push(msg.clone()),
            }
        }
        out
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn push(&mut self, role: Role, content: String) {
        // Blank replies carry nothing worth showing
        if content.trim().is_empty() {
            return;
        }
        self.messages.push(ChatMessage { role, content });
    }
}
