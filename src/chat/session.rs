//! The live, editable conversation.

use super::types::{Message, Role};

/// Ordered message log for the conversation currently being composed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatSession {
    messages: Vec<Message>,
    model: String,
    archived_id: Option<String>,
}

impl ChatSession {
    /// Create an empty session that will talk to `model`.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            model: model.into(),
            archived_id: None,
        }
    }

    /// Append a message at the end of the log.
    pub fn append(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(Message::new(role, content));
    }

    /// Remove and return the newest message.
    pub fn pop(&mut self) -> Option<Message> {
        self.messages.pop()
    }

    /// Drop all messages and the archive linkage. The selected model is kept.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.archived_id = None;
    }

    /// Set the model used for subsequent completion calls.
    pub fn select_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    /// Replace the log with a copy of archived messages, linked to `archived_id`.
    pub fn restore(&mut self, messages: &[Message], model: impl Into<String>, archived_id: &str) {
        self.messages = messages.to_vec();
        self.model = model.into();
        self.archived_id = Some(archived_id.to_string());
    }

    /// Messages in conversational order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Currently selected model identifier.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Id of the archive entry this session was last saved as or loaded from.
    #[must_use]
    pub fn archived_id(&self) -> Option<&str> {
        self.archived_id.as_deref()
    }

    /// Record the archive entry this session now corresponds to.
    pub fn link_archive(&mut self, id: impl Into<String>) {
        self.archived_id = Some(id.into());
    }

    /// Forget the archive linkage without touching the messages.
    pub fn unlink_archive(&mut self) {
        self.archived_id = None;
    }

    /// First message written by the user, if any.
    #[must_use]
    pub fn first_user_message(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.role == Role::User)
    }

    /// Whether the session has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
