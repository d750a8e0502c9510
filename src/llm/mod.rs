//! Completion API access.
//!
//! The controller only sees [`CompletionBackend`]; [`groq_client::GroqClient`]
//! is the production implementation talking to an OpenAI-compatible
//! `/chat/completions` endpoint.

pub mod error;
pub mod groq_client;

pub use error::{CompletionError, CompletionResult};
pub use groq_client::GroqClient;

use async_trait::async_trait;

use crate::chat::types::Message;

/// Something that turns a message log into the next assistant reply.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Run one completion call for `messages` against `model`.
    ///
    /// # Errors
    /// Returns a [`CompletionError`] when no reply text could be obtained.
    async fn complete(&self, messages: &[Message], model: &str) -> CompletionResult<String>;
}
