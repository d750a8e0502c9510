//! Errors for rejected chat actions.

use thiserror::Error;

/// A user action the controller refused to perform.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChatError {
    /// The submitted message was empty or whitespace only.
    #[error("message is empty")]
    EmptyMessage,
    /// A completion call is still running for this session.
    #[error("a reply is still being generated")]
    TurnInProgress,
    /// No model with this label in the catalog.
    #[error("unknown model: {0}")]
    UnknownModel(String),
}

/// Convenience result alias for chat actions.
pub type ChatResult<T> = Result<T, ChatError>;
