//! Error taxonomy of a completion call.

use thiserror::Error;

/// Why a completion call produced no model text.
///
/// The `Display` form is the user-facing text shown in place of the reply.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CompletionError {
    /// The API rejected the credential (HTTP 401).
    #[error("❌ Invalid API Key!")]
    Auth,
    /// The API answered with a status other than 200 or 401.
    #[error("❌ Error {status}")]
    Http {
        /// HTTP status code returned by the API.
        status: u16,
    },
    /// Connection failure, timeout, or an unusable response body.
    #[error("❌ Error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {err}"))
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Convenience result alias for completion calls.
pub type CompletionResult<T> = Result<T, CompletionError>;
