use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use super::{CompletionProvider, CompletionRequest, OpenAiCompatClient};
use crate::core::errors::ProviderError;
use crate::test_support::spawn_router;

#[derive(Clone, Default)]
struct Captured {
    bodies: Arc<Mutex<Vec<Value>>>,
    auth: Arc<Mutex<Vec<String>>>,
}

async fn spawn_chat_server(reply: Value, status: StatusCode) -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/v1/chat/completions",
            post(
                move |State(captured): State<Captured>, headers: HeaderMap, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        captured.bodies.lock().unwrap().push(body);
                        if let Some(auth) = headers.get("authorization") {
                            captured
                                .auth
                                .lock()
                                .unwrap()
                                .push(auth.to_str().unwrap_or_default().to_string());
                        }
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(captured.clone());
    (spawn_router(app).await, captured)
}

#[tokio::test]
async fn complete_returns_first_choice_content() {
    let (base_url, captured) = spawn_chat_server(
        json!({ "choices": [{ "message": { "role": "assistant", "content": "Drink fluids." } }] }),
        StatusCode::OK,
    )
    .await;
    let client = OpenAiCompatClient::new("groq", &base_url, "test-key", None).unwrap();

    let completion = client
        .complete(
            CompletionRequest::from_prompt("llama-3.3-70b-versatile", "How to treat a cold?")
                .with_temperature(0.0)
                .with_max_tokens(5),
        )
        .await
        .unwrap();

    assert_eq!(completion.text, "Drink fluids.");

    let bodies = captured.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    assert_eq!(bodies[0]["model"], json!("llama-3.3-70b-versatile"));
    assert_eq!(bodies[0]["stream"], json!(false));
    assert_eq!(bodies[0]["max_tokens"], json!(5));
    assert_eq!(bodies[0]["temperature"], json!(0.0));
    assert_eq!(
        bodies[0]["messages"],
        json!([{ "role": "user", "content": "How to treat a cold?" }])
    );
    assert_eq!(captured.auth.lock().unwrap()[0], "Bearer test-key");
}

#[tokio::test]
async fn optional_sampling_fields_are_omitted_when_unset() {
    let (base_url, captured) = spawn_chat_server(
        json!({ "choices": [{ "message": { "content": "ok" } }] }),
        StatusCode::OK,
    )
    .await;
    let client = OpenAiCompatClient::new("groq", &base_url, "k", None).unwrap();

    client
        .complete(CompletionRequest::from_prompt("m", "p"))
        .await
        .unwrap();

    let bodies = captured.bodies.lock().unwrap();
    assert!(bodies[0].get("temperature").is_none());
    assert!(bodies[0].get("max_tokens").is_none());
}

#[tokio::test]
async fn non_success_status_is_reported_with_body() {
    let (base_url, _) = spawn_chat_server(
        json!({ "error": { "message": "invalid api key" } }),
        StatusCode::UNAUTHORIZED,
    )
    .await;
    let client = OpenAiCompatClient::new("groq", &base_url, "bad", None).unwrap();

    let err = client
        .complete(CompletionRequest::from_prompt("m", "p"))
        .await
        .unwrap_err();

    match err {
        ProviderError::Status { status, body, .. } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid api key"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_content_is_malformed() {
    let (base_url, _) = spawn_chat_server(json!({ "choices": [] }), StatusCode::OK).await;
    let client = OpenAiCompatClient::new("groq", &base_url, "k", None).unwrap();

    let err = client
        .complete(CompletionRequest::from_prompt("m", "p"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Malformed { .. }));
}

#[tokio::test]
async fn blank_content_is_an_empty_completion() {
    let (base_url, _) = spawn_chat_server(
        json!({ "choices": [{ "message": { "content": "  \n" } }] }),
        StatusCode::OK,
    )
    .await;
    let client = OpenAiCompatClient::new("groq", &base_url, "k", None).unwrap();

    let err = client
        .complete(CompletionRequest::from_prompt("m", "p"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::EmptyCompletion { provider: "groq" }));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_error() {
    let client = OpenAiCompatClient::new("groq", "http://127.0.0.1:1", "k", None).unwrap();

    let err = client
        .complete(CompletionRequest::from_prompt("m", "p"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Transport { .. }));
}
