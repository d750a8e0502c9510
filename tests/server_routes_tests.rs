use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use futee_chat::chat::{ChatController, ModelCatalog};
use futee_chat::config::ApiKey;
use futee_chat::llm::{CompletionBackend, GroqClient};
use futee_chat::server::{AppState, create_router};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn router_for(server: &MockServer) -> Router {
    let client = GroqClient::new(
        format!("{}/openai/v1/chat/completions", server.uri()),
        ApiKey::new("test-key"),
    )
    .expect("client should build");
    let backend: Arc<dyn CompletionBackend> = Arc::new(client);
    let catalog = ModelCatalog::default().with_model("Llama 3.3 70B", "llama-3.3-70b-versatile");
    let state = AppState::new(ChatController::new(backend, catalog), "static");
    create_router(state)
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = router
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("router response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, bytes.to_vec())
}

async fn send_json(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(router, method, uri, body).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn mount_reply(server: &MockServer, content: &str) {
    Mock::given(method("POST"))
        .and(path("/openai/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": content}}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn health_reports_ok() {
    let server = MockServer::start().await;
    let router = router_for(&server).await;

    let (status, body) = send_json(&router, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn initial_state_is_empty_with_welcome() {
    let server = MockServer::start().await;
    let router = router_for(&server).await;

    let (status, view) = send_json(&router, Method::GET, "/api/state", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "empty");
    assert_eq!(view["model"], "llama-3.1-8b-instant");
    assert_eq!(view["model_label"], "Llama 3.1 8B");
    assert!(view["welcome"].is_string());
    assert_eq!(view["history"], json!([]));
    assert_eq!(view["models"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn submit_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "llama-3.1-8b-instant"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "Hello there"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let router = router_for(&server).await;

    let (status, view) = send_json(&router, Method::POST, "/api/chat", Some(json!({"message": "Hi"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        view["messages"],
        json!([
            {"role": "user", "content": "Hi"},
            {"role": "assistant", "content": "Hello there"}
        ])
    );
    assert_eq!(view["state"], "composing");
    assert_eq!(view["welcome"], Value::Null);
    assert_eq!(view["history"].as_array().map(Vec::len), Some(1));
    assert_eq!(view["history"][0]["title"], "Hi");
    assert_eq!(view["active_chat_id"], view["history"][0]["id"]);
}

#[tokio::test]
async fn api_failure_becomes_assistant_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let router = router_for(&server).await;

    let (status, view) = send_json(&router, Method::POST, "/api/chat", Some(json!({"message": "Hi"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["messages"][1]["role"], "assistant");
    assert_eq!(view["messages"][1]["content"], "❌ Error 500");
}

#[tokio::test]
async fn blank_message_is_rejected() {
    let server = MockServer::start().await;
    let router = router_for(&server).await;

    let (status, body) = send(&router, Method::POST, "/api/chat", Some(json!({"message": "  "}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(String::from_utf8_lossy(&body), "message is empty");
}

#[tokio::test]
async fn new_load_delete_and_clear() {
    let server = MockServer::start().await;
    mount_reply(&server, "Hello there").await;
    let router = router_for(&server).await;

    send_json(&router, Method::POST, "/api/chat", Some(json!({"message": "Hi"}))).await;
    let (_, view) = send_json(&router, Method::POST, "/api/chats/new", None).await;
    assert_eq!(view["state"], "empty");
    assert_eq!(view["messages"], json!([]));
    assert_eq!(view["history"].as_array().map(Vec::len), Some(1));
    let id = view["history"][0]["id"].as_str().unwrap_or_default().to_string();

    let (status, view) = send_json(&router, Method::POST, &format!("/api/chats/{id}/load"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["messages"].as_array().map(Vec::len), Some(2));
    assert_eq!(view["active_chat_id"], id.as_str());

    let (status, _) = send(&router, Method::POST, "/api/chats/missing/load", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, view) = send_json(&router, Method::DELETE, "/api/chats/missing", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["history"].as_array().map(Vec::len), Some(1));

    let (_, view) = send_json(&router, Method::DELETE, &format!("/api/chats/{id}"), None).await;
    assert_eq!(view["history"], json!([]));
    assert_eq!(view["active_chat_id"], Value::Null);

    send_json(&router, Method::POST, "/api/chat", Some(json!({"message": "again"}))).await;
    let (status, view) = send_json(&router, Method::DELETE, "/api/chats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["history"], json!([]));
}

#[tokio::test]
async fn model_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({"model": "llama-3.3-70b-versatile"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "big answer"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let router = router_for(&server).await;

    let (status, view) =
        send_json(&router, Method::POST, "/api/model", Some(json!({"label": "Llama 3.3 70B"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["model"], "llama-3.3-70b-versatile");

    let (status, _) = send(&router, Method::POST, "/api/model", Some(json!({"label": "GPT-99"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, view) = send_json(&router, Method::POST, "/api/chat", Some(json!({"message": "Hi"}))).await;
    assert_eq!(view["messages"][1]["content"], "big answer");
}

#[tokio::test]
async fn turn_in_flight_is_visible_and_blocks_conflicting_actions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "slow answer"}}]
                }))
                .set_delay(Duration::from_millis(1000)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let router = router_for(&server).await;

    let first = {
        let router = router.clone();
        tokio::spawn(async move {
            send_json(&router, Method::POST, "/api/chat", Some(json!({"message": "Hi"}))).await
        })
    };
    tokio::time::sleep(Duration::from_millis(200)).await;

    let (status, view) = send_json(&router, Method::GET, "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "awaiting_response");
    assert_eq!(view["messages"], json!([{"role": "user", "content": "Hi"}]));

    let (status, body) = send(&router, Method::POST, "/api/chat", Some(json!({"message": "again"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(String::from_utf8_lossy(&body), "a reply is still being generated");

    let (status, _) = send(&router, Method::POST, "/api/chats/new", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, view) = first.await.expect("first turn task");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "composing");
    assert_eq!(view["messages"].as_array().map(Vec::len), Some(2));
    assert_eq!(view["messages"][1]["content"], "slow answer");
}
