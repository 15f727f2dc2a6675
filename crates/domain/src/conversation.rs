//! Conversation turns as read from (and written back to) the caller's store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::retrieval::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Transcript prefix used when a turn is rendered into a prompt.
    pub fn label(self) -> &'static str {
        match self {
            TurnRole::User => "User",
            TurnRole::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
            timestamp: Utc::now(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            sources,
        }
    }
}

/// The trailing `window` turns of `history`, oldest first.
pub fn recent_window(history: &[ConversationTurn], window: usize) -> &[ConversationTurn] {
    let start = history.len().saturating_sub(window);
    &history[start..]
}

/// Drop all but the trailing `window` turns in place.
pub fn trim_to_window(history: &mut Vec<ConversationTurn>, window: usize) {
    let excess = history.len().saturating_sub(window);
    history.drain(..excess);
}
