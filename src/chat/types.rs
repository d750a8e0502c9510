//! Data model shared by the active session, the history store and the API.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the person using the chat.
    User,
    /// Text produced by the model (or a completion error rendered as text).
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Serializes as `{"role": ..., "content": ...}`,
/// which is also the shape the completion API expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Author of the message.
    pub role: Role,
    /// Message text.
    pub content: String,
}

impl Message {
    /// Build a message.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Build a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Build an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// A frozen snapshot of a conversation kept in the history store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedChat {
    /// Identifier derived from the archive time.
    pub id: String,
    /// Sidebar title, derived from the first user message.
    pub title: String,
    /// Human-readable archive time.
    pub timestamp: String,
    /// Copy of the session messages at archive time.
    pub messages: Vec<Message>,
    /// Model identifier used by the conversation. Empty when unknown.
    #[serde(default)]
    pub model: String,
}

/// Sidebar entry for an archived chat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    /// Archive identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Human-readable archive time.
    pub timestamp: String,
}

impl From<&ArchivedChat> for ChatSummary {
    fn from(chat: &ArchivedChat) -> Self {
        Self {
            id: chat.id.clone(),
            title: chat.title.clone(),
            timestamp: chat.timestamp.clone(),
        }
    }
}
