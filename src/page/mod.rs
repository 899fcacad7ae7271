use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod watch;

#[cfg(test)]
pub mod fake;

pub use watch::WatchPage;

/// Errors raised by a page driver
#[derive(thiserror::Error, Debug)]
pub enum PageError {
    #[error("HTTP error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} while fetching {url}")]
    Status { status: u16, url: String },

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Unknown element: {0}")]
    UnknownElement(String),
}

/// A node returned by a selector query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Opaque handle, only meaningful to the driver that produced it
    pub handle: String,

    /// Lowercase tag name
    pub tag: String,

    /// Concatenated text content
    pub text: String,

    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(handle: impl Into<String>, tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            tag: tag.into(),
            text: text.into(),
            attributes: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Case-insensitive match against the text and the `aria-label`
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.text.to_lowercase().contains(&needle)
            || self
                .attr("aria-label")
                .is_some_and(|label| label.to_lowercase().contains(&needle))
    }
}

/// A caption track attached to the video element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextTrack {
    pub index: usize,

    /// BCP-47 language tag, e.g. `en` or `es-419`
    pub language: String,

    /// Human readable label, e.g. `English (auto-generated)`
    pub label: String,

    /// Where the driver reads cues from, if it needs to
    pub source: Option<String>,
}

impl TextTrack {
    pub fn is_english(&self) -> bool {
        self.language == "en" || self.label.to_lowercase().contains("english")
    }
}

/// Everything the extractors need from an open video page.
///
/// Drivers answer CSS selector queries in document order. `activate` is the
/// equivalent of a user click; a driver that cannot react to input may treat
/// it as a no-op.
#[async_trait]
pub trait VideoPage: Send + Sync {
    /// Current page URL
    fn location(&self) -> &str;

    /// All nodes matching `selector`
    async fn query_all(&self, selector: &str) -> Result<Vec<Element>, PageError>;

    /// For each `outer` match, the text of its first `inner` descendant
    async fn query_within(&self, outer: &str, inner: &str) -> Result<Vec<Option<String>>, PageError>;

    /// Simulate activation of a control
    async fn activate(&self, element: &Element) -> Result<(), PageError>;

    /// Text tracks attached to the video element
    async fn text_tracks(&self) -> Result<Vec<TextTrack>, PageError>;

    /// Switch a track to showing so its cues get loaded
    async fn show_track(&self, track: &TextTrack) -> Result<(), PageError>;

    /// Cue texts of a track in track order
    async fn track_cues(&self, track: &TextTrack) -> Result<Vec<String>, PageError>;

    /// GET a URL with the page's own network access
    async fn fetch_text(&self, url: &str) -> Result<String, PageError>;
}

/// Poll for `selector` until it matches or `timeout` elapses
pub async fn wait_for(
    page: &dyn VideoPage,
    selector: &str,
    timeout: Duration,
    interval: Duration,
) -> Option<Element> {
    let poll = async {
        loop {
            if let Ok(found) = page.query_all(selector).await {
                if let Some(element) = found.into_iter().next() {
                    return element;
                }
            }
            tokio::time::sleep(interval).await;
        }
    };

    match tokio::time::timeout(timeout, poll).await {
        Ok(element) => Some(element),
        Err(_) => {
            tracing::debug!(selector, ?timeout, "Timed out waiting for element");
            None
        }
    }
}

/// Fixed delay used to let the page settle after an interaction
pub async fn settle(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
