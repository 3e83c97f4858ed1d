/// Integration tests for `GeminiClient` against a local stub of the
/// `generateContent` endpoint.
///
/// The stub runs on its own runtime in a background thread; the blocking
/// client is driven from the test thread.
use std::time::Duration;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use gemqa::{GeminiClientBuilder, GeminiClientTrait, GeminiError};
use serde_json::{Value, json};

async fn generate_content(
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if call != "gemini-test:generateContent" {
        return (StatusCode::NOT_FOUND, "unknown model").into_response();
    }

    let key = headers
        .get("x-goog-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let prompt = body["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap_or_default()
        .to_string();

    if key == "slow-key" {
        tokio::time::sleep(Duration::from_secs(3)).await;
    }

    match key {
        "good-key" | "slow-key" => Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": format!("You asked: {prompt}")}]},
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        "blocked-key" => Json(json!({"promptFeedback": {"blockReason": "SAFETY"}})).into_response(),
        "garbage-key" => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })),
        )
            .into_response(),
    }
}

/// Starts the stub server and returns its base URL.
fn spawn_stub_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).unwrap();
            let app = Router::new().route("/v1beta/models/:call", post(generate_content));
            axum::serve(listener, app).await.unwrap();
        });
    });

    format!("http://{}", addr)
}

fn client_with_key(base_url: &str, key: &str) -> gemqa::GeminiClient {
    GeminiClientBuilder::new()
        .api_key(key)
        .model("gemini-test")
        .base_url(base_url)
        .build()
        .unwrap()
}

#[test]
fn generate_returns_candidate_text() {
    let base_url = spawn_stub_server();
    let client = client_with_key(&base_url, "good-key");

    let answer = client.generate("what is 22").unwrap();
    assert_eq!(answer, "You asked: what is 22");
}

#[test]
fn generate_reports_upstream_rejection_with_message() {
    let base_url = spawn_stub_server();
    let client = client_with_key(&base_url, "wrong-key");

    match client.generate("hello") {
        Err(GeminiError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert!(message.contains("API key not valid"));
        }
        other => panic!("Expected Rejected error, got {:?}", other),
    }
}

#[test]
fn generate_reports_blocked_prompt() {
    let base_url = spawn_stub_server();
    let client = client_with_key(&base_url, "blocked-key");

    assert!(matches!(
        client.generate("hello"),
        Err(GeminiError::Blocked { reason }) if reason == "SAFETY"
    ));
}

#[test]
fn generate_reports_malformed_body() {
    let base_url = spawn_stub_server();
    let client = client_with_key(&base_url, "garbage-key");

    assert!(matches!(
        client.generate("hello"),
        Err(GeminiError::MalformedResponse(_))
    ));
}

#[test]
fn generate_reports_unknown_model_as_rejection() {
    let base_url = spawn_stub_server();
    let client = GeminiClientBuilder::new()
        .api_key("good-key")
        .model("other-model")
        .base_url(&base_url)
        .build()
        .unwrap();

    assert!(matches!(
        client.generate("hello"),
        Err(GeminiError::Rejected { status: 404, .. })
    ));
}

#[test]
fn generate_handles_unreachable_server_gracefully() {
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    let client = client_with_key(&base_url, "good-key");
    let error = client.generate("hello").unwrap_err();

    assert!(
        matches!(error, GeminiError::Network(_) | GeminiError::Timeout(_)),
        "Expected network/timeout error, got: {}",
        error
    );

    // Every cause in the chain is part of the message
    let message = error.to_string();
    let mut cause = std::error::Error::source(&error);
    while let Some(inner) = cause {
        assert!(
            message.contains(&inner.to_string()),
            "{message:?} is missing cause {inner:?}"
        );
        cause = inner.source();
    }
}

#[test]
fn generate_reports_slow_server_as_timeout() {
    let base_url = spawn_stub_server();
    let client = GeminiClientBuilder::new()
        .api_key("slow-key")
        .model("gemini-test")
        .base_url(&base_url)
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap();

    let error = client.generate("hello").unwrap_err();

    assert!(
        matches!(error, GeminiError::Timeout(_)),
        "Expected timeout error, got: {}",
        error
    );
    assert!(error.to_string().starts_with("Request timed out: "));
}
