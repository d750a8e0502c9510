//! Chat session lifecycle.
//!
//! - [`session::ChatSession`]: the live conversation.
//! - [`history::HistoryStore`]: archived snapshots, newest first, capped.
//! - [`catalog::ModelCatalog`]: selectable models.
//! - [`controller::ChatController`]: runs user actions and renders [`view::ChatView`].

pub mod catalog;
pub mod clock;
pub mod controller;
pub mod error;
pub mod history;
pub mod session;
pub mod types;
pub mod view;

pub use catalog::{ModelCatalog, ModelOption};
pub use controller::{ChatController, PendingTurn};
pub use error::{ChatError, ChatResult};
pub use history::HistoryStore;
pub use session::ChatSession;
pub use types::{ArchivedChat, ChatSummary, Message, Role};
pub use view::{ChatView, SessionState};
