use serde::{Deserialize, Serialize};
use std::fmt;

/// Role-play setting the tutor adopts for the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    #[default]
    General,
    Restaurant,
    Shopping,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::General, Scenario::Restaurant, Scenario::Shopping];

    /// Wire name understood by the backend
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Restaurant => "restaurant",
            Self::Shopping => "shopping",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::General => "Free conversation",
            Self::Restaurant => "At a restaurant",
            Self::Shopping => "Shopping",
        }
    }

    /// Unknown names fall back to `General`, as the backend does.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == name)
            .unwrap_or_default()
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
