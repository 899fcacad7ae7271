use axum::{extract::Query, routing::get, Router};
use std::collections::HashMap;
use yt_digest::config::ExtractionConfig;
use yt_digest::{TranscriptError, TranscriptExtractor, VideoPage, WatchPage};

const WATCH_URL: &str = "https://www.youtube.com/watch?v=abc123";

/// Captions server: `lang=en` on the plain endpoint is empty, tracks are served by `name`
async fn mock_captions() -> String {
    let app = Router::new().route(
        "/api/timedtext",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            match params.get("name").map(String::as_str) {
                Some("es") => r#"<transcript><text start="0" dur="1">hola</text><text start="1" dur="1">mundo</text></transcript>"#,
                Some("en") => r#"<transcript><text start="0" dur="1">hello</text><text start="1" dur="1">world</text></transcript>"#,
                _ => "",
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}/api/timedtext")
}

fn watch_html(endpoint: &str) -> String {
    format!(
        r#"<html><head><script>var ytInitialPlayerResponse = {{"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[
            {{"baseUrl":"{endpoint}?v=abc123&name=es","name":{{"simpleText":"Spanish"}},"languageCode":"es"}},
            {{"baseUrl":"{endpoint}?v=abc123&name=en","name":{{"simpleText":"English"}},"languageCode":"en"}}
        ]}}}}}};</script></head><body><h1 class="title">Demo</h1></body></html>"#
    )
}

fn config(endpoint: &str) -> ExtractionConfig {
    let mut config = ExtractionConfig::default().without_delays();
    config.timed_text_url = endpoint.to_string();
    config
}

#[tokio::test]
async fn test_static_page_reads_english_caption_track() {
    let endpoint = mock_captions().await;
    let page = WatchPage::from_html(reqwest::Client::new(), WATCH_URL, watch_html(&endpoint));

    let transcript = TranscriptExtractor::new(config(&endpoint))
        .extract(&page)
        .await
        .unwrap();

    assert_eq!(transcript.text, "hello world");
    assert_eq!(transcript.source, "text-tracks");
}

#[tokio::test]
async fn test_static_page_without_captions_is_unavailable() {
    let endpoint = mock_captions().await;
    let page = WatchPage::from_html(
        reqwest::Client::new(),
        WATCH_URL,
        "<html><body><button>Show transcript</button></body></html>",
    );

    let result = TranscriptExtractor::new(config(&endpoint)).extract(&page).await;

    assert_eq!(result, Err(TranscriptError::TranscriptUnavailable));
}

#[tokio::test]
async fn test_fetch_text_reports_http_status() {
    let endpoint = mock_captions().await;
    let page = WatchPage::from_html(reqwest::Client::new(), WATCH_URL, "");

    let missing = endpoint.replace("/api/timedtext", "/missing");
    assert!(page.fetch_text(&missing).await.is_err());
    assert_eq!(page.fetch_text(&endpoint).await.unwrap(), "");
}
