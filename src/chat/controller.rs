//! Orchestration of chat actions over the session, the history and the backend.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::llm::CompletionBackend;

use super::catalog::ModelCatalog;
use super::error::{ChatError, ChatResult};
use super::history::HistoryStore;
use super::session::ChatSession;
use super::types::{Message, Role};
use super::view::{ChatView, SessionState, WELCOME_MESSAGE};

/// Owns the active session and the history, and runs every user action.
pub struct ChatController {
    session: ChatSession,
    history: HistoryStore,
    catalog: ModelCatalog,
    backend: Arc<dyn CompletionBackend>,
    awaiting_response: bool,
}

impl ChatController {
    /// Start with an empty session on the catalog's default model.
    #[must_use]
    pub fn new(backend: Arc<dyn CompletionBackend>, catalog: ModelCatalog) -> Self {
        Self::with_history(backend, catalog, HistoryStore::new())
    }

    /// Start with an empty session and a pre-built history store.
    #[must_use]
    pub fn with_history(
        backend: Arc<dyn CompletionBackend>,
        catalog: ModelCatalog,
        history: HistoryStore,
    ) -> Self {
        let session = ChatSession::new(catalog.default_model_id());
        Self {
            session,
            history,
            catalog,
            backend,
            awaiting_response: false,
        }
    }

    /// Lifecycle state of the active session.
    #[must_use]
    pub fn state(&self) -> SessionState {
        if self.awaiting_response {
            SessionState::AwaitingResponse
        } else if self.session.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Composing
        }
    }

    /// The active session.
    #[must_use]
    pub const fn session(&self) -> &ChatSession {
        &self.session
    }

    /// The archived chats.
    #[must_use]
    pub const fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Archive the current conversation, if any, and start a fresh one.
    ///
    /// # Errors
    /// Returns an error while a turn is in flight.
    pub fn new_chat(&mut self) -> ChatResult<()> {
        self.ensure_idle()?;
        if !self.session.is_empty() {
            self.save_session();
        }
        self.session.reset();
        info!("Started a new chat");
        Ok(())
    }

    /// Run one chat turn: record `text`, ask the backend, record the reply and
    /// auto-save the conversation.
    ///
    /// Completion failures do not fail the turn; their text becomes the reply.
    /// Dropping the returned future before it completes rolls the turn back.
    ///
    /// # Errors
    /// Returns an error if `text` is blank or a turn is already in flight.
    pub async fn submit(&mut self, text: &str) -> ChatResult<String> {
        let turn = self.begin_turn(text)?;
        let guard = TurnGuard {
            controller: self,
            finished: false,
        };
        let reply = turn.run().await;
        guard.finish(reply.clone());
        Ok(reply)
    }

    /// First half of a turn: record `text` and enter `AwaitingResponse`.
    ///
    /// The returned [`PendingTurn`] owns everything the completion call needs,
    /// so it can run without access to the controller. Complete the turn with
    /// [`ChatController::finish_turn`] or undo it with [`ChatController::abort_turn`].
    ///
    /// # Errors
    /// Returns an error if `text` is blank or a turn is already in flight.
    pub fn begin_turn(&mut self, text: &str) -> ChatResult<PendingTurn> {
        self.ensure_idle()?;
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        self.session.append(Role::User, text);
        self.awaiting_response = true;
        debug!(
            model = self.session.model(),
            messages = self.session.len(),
            "Awaiting completion"
        );

        Ok(PendingTurn {
            backend: Arc::clone(&self.backend),
            messages: self.session.messages().to_vec(),
            model: self.session.model().to_string(),
        })
    }

    /// Second half of a turn: record `reply` and auto-save the conversation.
    ///
    /// Ignored when no turn is in flight.
    pub fn finish_turn(&mut self, reply: impl Into<String>) {
        if !self.awaiting_response {
            warn!("Reply arrived with no turn in flight; dropped");
            return;
        }
        self.awaiting_response = false;
        self.session.append(Role::Assistant, reply);
        self.save_session();
    }

    /// Undo an unfinished turn: drop its user message and leave `AwaitingResponse`.
    pub fn abort_turn(&mut self) {
        if !self.awaiting_response {
            return;
        }
        self.awaiting_response = false;
        if self.session.messages().last().map(|m| m.role) == Some(Role::User) {
            self.session.pop();
        }
        warn!("Chat turn aborted before a reply was recorded");
    }

    /// Replace the active session with a copy of an archived chat.
    ///
    /// Returns `Ok(false)`, leaving the session untouched, if `id` is unknown.
    ///
    /// # Errors
    /// Returns an error while a turn is in flight.
    pub fn load_chat(&mut self, id: &str) -> ChatResult<bool> {
        self.ensure_idle()?;
        let Some(chat) = self.history.load(id) else {
            debug!("Load requested for unknown chat {id}");
            return Ok(false);
        };

        let model = if chat.model.is_empty() {
            self.catalog.default_model_id().to_string()
        } else {
            chat.model.clone()
        };
        self.session.restore(&chat.messages, model, &chat.id);
        info!("Loaded chat {id}");
        Ok(true)
    }

    /// Remove an archived chat. Unknown ids are ignored.
    pub fn delete_chat(&mut self, id: &str) {
        if self.history.delete(id) {
            info!("Deleted chat {id}");
        }
        if self.session.archived_id() == Some(id) {
            self.session.unlink_archive();
        }
    }

    /// Remove every archived chat.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.session.unlink_archive();
        info!("History cleared");
    }

    /// Select the model with catalog label `label` for the active session.
    ///
    /// # Errors
    /// Returns an error if no catalog entry has this label.
    pub fn select_model(&mut self, label: &str) -> ChatResult<()> {
        let model = self
            .catalog
            .by_label(label)
            .ok_or_else(|| ChatError::UnknownModel(label.to_string()))?;
        self.session.select_model(model.id.clone());
        debug!("Selected model {}", model.id);
        Ok(())
    }

    /// Snapshot for rendering.
    #[must_use]
    pub fn view(&self) -> ChatView {
        let model = self.session.model();
        ChatView {
            state: self.state(),
            model: model.to_string(),
            model_label: self.catalog.by_id(model).map(|m| m.label.clone()),
            models: self.catalog.models().to_vec(),
            messages: self.session.messages().to_vec(),
            welcome: self.session.is_empty().then_some(WELCOME_MESSAGE),
            active_chat_id: self.session.archived_id().map(str::to_string),
            history: self.history.summaries(),
        }
    }

    const fn ensure_idle(&self) -> ChatResult<()> {
        if self.awaiting_response {
            Err(ChatError::TurnInProgress)
        } else {
            Ok(())
        }
    }

    // The newest snapshot supersedes the one the session was linked to.
    fn save_session(&mut self) {
        if let Some(previous) = self.session.archived_id() {
            self.history.delete(previous);
        }
        match self.history.archive(&self.session) {
            Some(id) => self.session.link_archive(id),
            None => self.session.unlink_archive(),
        }
    }
}

/// A turn whose completion call has not run yet.
pub struct PendingTurn {
    backend: Arc<dyn CompletionBackend>,
    messages: Vec<Message>,
    model: String,
}

impl PendingTurn {
    /// Run the completion call. Failures are turned into their reply text.
    pub async fn run(self) -> String {
        match self.backend.complete(&self.messages, &self.model).await {
            Ok(reply) => reply,
            Err(err) => err.to_string(),
        }
    }
}

// Rolls the turn back if `submit` is dropped mid-call.
struct TurnGuard<'a> {
    controller: &'a mut ChatController,
    finished: bool,
}

impl TurnGuard<'_> {
    fn finish(mut self, reply: String) {
        self.controller.finish_turn(reply);
        self.finished = true;
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.controller.abort_turn();
        }
    }
}
