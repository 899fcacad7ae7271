use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use yt_digest::{CompletionClient, SummarizeError, Summarizer};

type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

/// Serve `/v1/completions` with a canned response, recording each request
async fn mock_completions(status: StatusCode, body: &'static str) -> (String, Seen) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();

    let app = Router::new().route(
        "/v1/completions",
        post(move |headers: HeaderMap, Json(payload): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                recorder.lock().unwrap().push((auth, payload));
                (status, [("content-type", "application/json")], body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/v1"), seen)
}

#[tokio::test]
async fn test_summary_is_trimmed_first_choice() {
    let (base_url, seen) = mock_completions(
        StatusCode::OK,
        r#"{"id":"cmpl-1","choices":[{"text":" Hello world ","finish_reason":"stop"},{"text":"ignored"}]}"#,
    )
    .await;

    let client = CompletionClient::new("test-key").with_base_url(base_url);
    let summary = client.summarize("a transcript").await.unwrap();

    assert_eq!(summary, "Hello world");

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1, "exactly one request should be sent");
    let (auth, payload) = &seen[0];
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(payload["model"], "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free");
    assert_eq!(payload["max_tokens"], 1000);
    assert!(payload["prompt"]
        .as_str()
        .unwrap()
        .contains("Transcript:\na transcript\n\nSummary:"));
}

#[tokio::test]
async fn test_unauthorized_is_api_error_with_payload() {
    let (base_url, seen) = mock_completions(StatusCode::UNAUTHORIZED, r#"{"error":"invalid_api_key"}"#).await;

    let client = CompletionClient::new("bad-key").with_base_url(base_url);
    let err = client.summarize("a transcript").await.unwrap_err();

    assert!(matches!(err, SummarizeError::Api { status: 401, .. }));
    assert_eq!(err.to_string(), r#"API error: 401 - {"error":"invalid_api_key"}"#);
    assert_eq!(seen.lock().unwrap().len(), 1, "errors are not retried");
}

#[tokio::test]
async fn test_no_choices_is_empty_completion() {
    let (base_url, _) = mock_completions(StatusCode::OK, r#"{"choices":[]}"#).await;

    let client = CompletionClient::new("key").with_base_url(base_url);
    let err = client.summarize("a transcript").await.unwrap_err();

    assert!(matches!(err, SummarizeError::EmptyCompletion));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_request_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = CompletionClient::new("key").with_base_url(format!("http://{addr}/v1"));
    let err = client.summarize("a transcript").await.unwrap_err();

    assert!(matches!(err, SummarizeError::Request(_)), "got {err:?}");
}

/// Read one HTTP request, answer 500 with a body cut short, then hang up
async fn truncated_error_server() -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())
                            .flatten()
                    })
                    .unwrap_or(0);
                if request.len() >= end + 4 + length {
                    break;
                }
            }
        }

        socket
            .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\n{\"error\"")
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    format!("http://{addr}/v1")
}

#[tokio::test]
async fn test_unreadable_error_body_is_request_failure() {
    let base_url = truncated_error_server().await;

    let client = CompletionClient::new("key").with_base_url(base_url);
    let err = client.summarize("a transcript").await.unwrap_err();

    assert!(matches!(err, SummarizeError::Request(_)), "got {err:?}");
}
