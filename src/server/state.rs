//! Application state shared across all request handlers.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::chat::ChatController;
use crate::config::ChatConfig;
use crate::llm::{CompletionBackend, CompletionResult, GroqClient};

/// Shared application state.
pub struct AppState {
    /// Chat controller. The lock serialises user actions.
    pub controller: Arc<Mutex<ChatController>>,
    /// Directory served at `/`.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Wrap an existing controller.
    #[must_use]
    pub fn new(controller: ChatController, static_dir: impl Into<PathBuf>) -> Arc<Self> {
        Arc::new(Self {
            controller: Arc::new(Mutex::new(controller)),
            static_dir: static_dir.into(),
        })
    }

    /// Build the completion client and a fresh controller from configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(config: &ChatConfig) -> CompletionResult<Arc<Self>> {
        let backend: Arc<dyn CompletionBackend> = Arc::new(GroqClient::from_config(config)?);
        let controller = ChatController::new(backend, config.models.clone());
        Ok(Self::new(controller, config.static_dir.clone()))
    }
}
