//! HTTP route handlers for the chat API.
//!
//! Every action answers with the new [`ChatView`], so the page only has to
//! redraw what it receives.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::services::ServeDir;

use crate::chat::{ChatError, ChatView};

use super::state::AppState;

/// Handler error: status plus plain-text body.
type ApiError = (StatusCode, String);

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let static_files = ServeDir::new(&state.static_dir);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/state", get(current_state))
        .route("/api/chat", post(submit_message))
        .route("/api/model", post(select_model))
        .route("/api/chats", delete(clear_history))
        .route("/api/chats/new", post(new_chat))
        .route("/api/chats/{id}", delete(delete_chat))
        .route("/api/chats/{id}/load", post(load_chat))
        .fallback_service(static_files)
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "futee-chat",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Current render snapshot.
async fn current_state(State(state): State<Arc<AppState>>) -> Json<ChatView> {
    Json(state.controller.lock().await.view())
}

/// Chat message submission.
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// The user's message.
    pub message: String,
}

/// Run one chat turn.
///
/// The controller lock is held only to record the user message and, later,
/// the reply; other requests see `awaiting_response` in between. The
/// completion call runs on its own task so a dropped connection cannot cancel
/// it between the user message and the reply.
async fn submit_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<ChatView>, ApiError> {
    let turn = state
        .controller
        .lock()
        .await
        .begin_turn(&request.message)
        .map_err(chat_error)?;

    let controller = Arc::clone(&state.controller);
    let task = tokio::spawn(async move {
        let reply = turn.run().await;
        let mut chat = controller.lock().await;
        chat.finish_turn(reply);
        chat.view()
    });

    match task.await {
        Ok(view) => Ok(Json(view)),
        Err(e) => {
            state.controller.lock().await.abort_turn();
            Err((StatusCode::INTERNAL_SERVER_ERROR, format!("Chat turn aborted: {e}")))
        }
    }
}

/// Model selection request.
#[derive(Debug, Deserialize)]
pub struct SelectModelRequest {
    /// Catalog label of the model.
    pub label: String,
}

/// Select the model for subsequent turns.
async fn select_model(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectModelRequest>,
) -> Result<Json<ChatView>, ApiError> {
    let mut chat = state.controller.lock().await;
    chat.select_model(&request.label).map_err(chat_error)?;
    Ok(Json(chat.view()))
}

/// Archive the current conversation and start a new one.
async fn new_chat(State(state): State<Arc<AppState>>) -> Result<Json<ChatView>, ApiError> {
    let mut chat = state.controller.lock().await;
    chat.new_chat().map_err(chat_error)?;
    Ok(Json(chat.view()))
}

/// Load an archived chat into the active session.
async fn load_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ChatView>, ApiError> {
    let mut chat = state.controller.lock().await;
    if !chat.load_chat(&id).map_err(chat_error)? {
        return Err((StatusCode::NOT_FOUND, "Chat not found".to_string()));
    }
    Ok(Json(chat.view()))
}

/// Delete an archived chat. Unknown ids are not an error.
async fn delete_chat(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<ChatView> {
    let mut chat = state.controller.lock().await;
    chat.delete_chat(&id);
    Json(chat.view())
}

/// Delete every archived chat.
async fn clear_history(State(state): State<Arc<AppState>>) -> Json<ChatView> {
    let mut chat = state.controller.lock().await;
    chat.clear_history();
    Json(chat.view())
}

fn chat_error(err: ChatError) -> ApiError {
    let status = match err {
        ChatError::EmptyMessage | ChatError::UnknownModel(_) => StatusCode::BAD_REQUEST,
        ChatError::TurnInProgress => StatusCode::CONFLICT,
    };
    (status, err.to_string())
}
