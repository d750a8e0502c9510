//! Render snapshot returned after every action.

use serde::Serialize;

use super::catalog::ModelOption;
use super::types::{ChatSummary, Message};

/// Greeting shown while the active session has no messages.
pub const WELCOME_MESSAGE: &str = "👋 Hi! I'm your AI assistant! How can I assist you today?";

/// Lifecycle state of the active session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No messages yet.
    Empty,
    /// Messages exist and input is accepted.
    Composing,
    /// A completion call is in flight.
    AwaitingResponse,
}

/// Everything the page needs to redraw itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatView {
    /// Lifecycle state of the active session.
    pub state: SessionState,
    /// Selected model identifier.
    pub model: String,
    /// Label of the selected model, when it is in the catalog.
    pub model_label: Option<String>,
    /// Model picker entries.
    pub models: Vec<ModelOption>,
    /// Active session messages in display order.
    pub messages: Vec<Message>,
    /// Greeting for an empty session.
    pub welcome: Option<&'static str>,
    /// Archive entry the active session corresponds to.
    pub active_chat_id: Option<String>,
    /// Sidebar history, newest first.
    pub history: Vec<ChatSummary>,
}
