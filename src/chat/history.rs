//! Bounded, newest-first collection of archived chats.

use std::sync::Arc;

use tracing::debug;

use super::clock::{Clock, SystemClock};
use super::session::ChatSession;
use super::types::{ArchivedChat, ChatSummary, Message, Role};

/// Maximum number of archived chats kept; older ones are evicted.
pub const MAX_ARCHIVED_CHATS: usize = 20;

/// Maximum number of characters of the first user message used as a title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Appended to titles cut at [`TITLE_MAX_CHARS`].
pub const TITLE_ELLIPSIS: &str = "...";

/// Title used when a conversation has no user message.
pub const UNTITLED_CHAT: &str = "New Chat";

/// `strftime` layout of archive ids.
const ID_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `strftime` layout of the displayed archive time.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Derive a sidebar title from the first user message of a conversation.
#[must_use]
pub fn derive_title(messages: &[Message]) -> String {
    let Some(first) = messages.iter().find(|m| m.role == Role::User) else {
        return UNTITLED_CHAT.to_string();
    };

    let mut chars = first.content.chars();
    let mut title: String = chars.by_ref().take(TITLE_MAX_CHARS).collect();
    if chars.next().is_some() {
        title.push_str(TITLE_ELLIPSIS);
    }
    title
}

/// Archived chats, newest first, capped at [`MAX_ARCHIVED_CHATS`].
pub struct HistoryStore {
    entries: Vec<ArchivedChat>,
    clock: Arc<dyn Clock>,
    last_second: Option<String>,
    same_second: u32,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    /// Create an empty store stamped by the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Vec::new(),
            clock,
            last_second: None,
            same_second: 0,
        }
    }

    /// Snapshot `session` at the front of the history.
    ///
    /// Returns the id of the new entry, or `None` when the session is empty.
    pub fn archive(&mut self, session: &ChatSession) -> Option<String> {
        if session.is_empty() {
            return None;
        }

        let now = self.clock.now();
        let id = self.next_id(&now.format(ID_FORMAT).to_string());
        let entry = ArchivedChat {
            id: id.clone(),
            title: derive_title(session.messages()),
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            messages: session.messages().to_vec(),
            model: session.model().to_string(),
        };

        self.entries.insert(0, entry);
        if self.entries.len() > MAX_ARCHIVED_CHATS {
            let evicted = self.entries.len() - MAX_ARCHIVED_CHATS;
            self.entries.truncate(MAX_ARCHIVED_CHATS);
            debug!("Evicted {evicted} archived chat(s) beyond the cap");
        }

        Some(id)
    }

    /// Look up an archived chat without removing it.
    #[must_use]
    pub fn load(&self, id: &str) -> Option<&ArchivedChat> {
        self.entries.iter().find(|c| c.id == id)
    }

    /// Remove the chat with `id`. Missing ids are ignored.
    ///
    /// Returns whether an entry was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|c| c.id != id);
        self.entries.len() != before
    }

    /// Remove every archived chat.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sidebar entries, newest first.
    #[must_use]
    pub fn summaries(&self) -> Vec<ChatSummary> {
        self.entries.iter().map(ChatSummary::from).collect()
    }

    /// Number of archived chats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the history is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Second-precision ids collide when two archives land in the same second;
    // later ones get a `-N` suffix.
    fn next_id(&mut self, second: &str) -> String {
        if self.last_second.as_deref() == Some(second) {
            self.same_second += 1;
        } else {
            self.last_second = Some(second.to_string());
            self.same_second = 0;
        }

        loop {
            let candidate = if self.same_second == 0 {
                second.to_string()
            } else {
                format!("{second}-{}", self.same_second)
            };
            if self.load(&candidate).is_none() {
                return candidate;
            }
            self.same_second += 1;
        }
    }
}
