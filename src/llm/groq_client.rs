//! Client for Groq's OpenAI-compatible chat-completions endpoint.
//!
//! Behaviour:
//! - One `POST` per call, no retries.
//! - Fixed sampling settings (`temperature = 0.7`, `max_tokens = 1024`).
//! - 30 second budget for the whole exchange.
//! - Status mapping: 200 is success, 401 is an auth failure, anything else
//!   is reported with its status code.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::chat::types::Message;
use crate::config::{ApiKey, ChatConfig};

use super::error::{CompletionError, CompletionResult};
use super::CompletionBackend;

/// Default chat-completions endpoint.
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Sampling temperature sent with every request.
pub const TEMPERATURE: f64 = 0.7;

/// Maximum number of generated tokens per reply.
pub const MAX_TOKENS: u32 = 1024;

/// Budget for one completion call, connection included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Async client for one chat-completions endpoint, bound to one credential.
pub struct GroqClient {
    client: Client,
    api_url: String,
    api_key: ApiKey,
}

impl GroqClient {
    /// Create a client for `api_url` with the standard request budget.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: impl Into<String>, api_key: ApiKey) -> CompletionResult<Self> {
        Self::with_timeout(api_url, api_key, REQUEST_TIMEOUT)
    }

    /// Create a client with a custom request budget.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_timeout(
        api_url: impl Into<String>,
        api_key: ApiKey,
        timeout: Duration,
    ) -> CompletionResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
            api_key,
        })
    }

    /// Create a client from resolved startup configuration.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ChatConfig) -> CompletionResult<Self> {
        Self::new(config.api_url.clone(), config.api_key.clone())
    }

    async fn post_completion(&self, messages: &[Message], model: &str) -> CompletionResult<String> {
        let request = ChatCompletionRequest {
            model,
            messages,
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        debug!(model, messages = messages.len(), "Sending completion request");
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(self.api_key.expose())
            .json(&request)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Err(CompletionError::Auth),
            status => return Err(CompletionError::Http { status: status.as_u16() }),
        }

        let body = response.bytes().await?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&body)
            .map_err(|e| CompletionError::Transport(format!("malformed response body: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::Transport("response contained no message content".to_string()))
    }
}

#[async_trait]
impl CompletionBackend for GroqClient {
    async fn complete(&self, messages: &[Message], model: &str) -> CompletionResult<String> {
        let result = self.post_completion(messages, model).await;
        if let Err(err) = &result {
            warn!(model, error = ?err, "Completion call failed");
        }
        result
    }
}
