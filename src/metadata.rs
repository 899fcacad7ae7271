use serde::{Deserialize, Serialize};

use crate::page::VideoPage;
use crate::utils::format_iso8601_duration;

/// Display-only facts about the video, all best effort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub channel: String,
    pub duration: String,
}

impl VideoMetadata {
    pub const UNKNOWN_TITLE: &'static str = "Unknown Title";
    pub const UNKNOWN_CHANNEL: &'static str = "Unknown Channel";
    pub const UNKNOWN_DURATION: &'static str = "Unknown";

    /// Title if one was actually found on the page
    pub fn known_title(&self) -> Option<&str> {
        (self.title != Self::UNKNOWN_TITLE).then_some(self.title.as_str())
    }
}

impl Default for VideoMetadata {
    fn default() -> Self {
        Self {
            title: Self::UNKNOWN_TITLE.to_string(),
            channel: Self::UNKNOWN_CHANNEL.to_string(),
            duration: Self::UNKNOWN_DURATION.to_string(),
        }
    }
}

/// Scrape title, channel and duration from the page
#[tracing::instrument(skip_all)]
pub async fn scrape(page: &dyn VideoPage) -> VideoMetadata {
    let title = match first_text(page, &["h1.ytd-watch-metadata", "h1.title"]).await {
        Some(title) => Some(title),
        None => first_attr(page, r#"meta[name="title"]"#, "content").await,
    };

    let channel = match first_text(page, &["#channel-name a"]).await {
        Some(channel) => Some(channel),
        None => first_attr(page, r#"link[itemprop="name"]"#, "content").await,
    };

    let duration = match first_text(page, &[".ytp-time-duration"]).await {
        Some(duration) => Some(duration),
        None => first_attr(page, r#"meta[itemprop="duration"]"#, "content")
            .await
            .and_then(|iso| format_iso8601_duration(&iso)),
    };

    let defaults = VideoMetadata::default();
    VideoMetadata {
        title: title.unwrap_or(defaults.title),
        channel: channel.unwrap_or(defaults.channel),
        duration: duration.unwrap_or(defaults.duration),
    }
}

async fn first_text(page: &dyn VideoPage, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        let found = page
            .query_all(selector)
            .await
            .ok()
            .and_then(|elements| elements.into_iter().next())
            .map(|element| element.text.trim().to_string())
            .filter(|text| !text.is_empty());

        if found.is_some() {
            return found;
        }
    }
    None
}

async fn first_attr(page: &dyn VideoPage, selector: &str, attr: &str) -> Option<String> {
    page.query_all(selector)
        .await
        .ok()?
        .into_iter()
        .find_map(|element| element.attr(attr).map(|v| v.trim().to_string()))
        .filter(|value| !value.is_empty())
}
