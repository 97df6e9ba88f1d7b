//! Chat message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single message in a chat exchange.
///
/// Messages form an append-only sequence held in page memory only; nothing
/// is persisted between visits to the chatbot page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message
    pub role: ChatRole,
    /// Message text
    pub content: String,
    /// When the message was produced
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create an assistant reply stamped with the current time
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Originator of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The logged-in patient
    User,
    /// The AI assistant
    Assistant,
}
