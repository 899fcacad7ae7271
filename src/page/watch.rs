use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use super::{Element, PageError, TextTrack, VideoPage};
use crate::extractors::timedtext::parse_timed_text_segments;

static PLAYER_RESPONSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)ytInitialPlayerResponse\s*=\s*(\{.*?\});\s*(?:var\s|</script>)")
        .expect("player response pattern is valid")
});

/// Static snapshot of a watch page fetched over HTTP.
///
/// Selector queries run against the HTML as served. Text tracks come from
/// the `captionTracks` list embedded in `ytInitialPlayerResponse`, and their
/// cues are read by fetching each track's timed-text URL. The snapshot does
/// not run scripts, so activating a control leaves the document unchanged.
/// Query results are cached per selector since the document never changes.
pub struct WatchPage {
    client: Client,
    location: String,
    html: String,
    tracks: Vec<TextTrack>,
    queries: Mutex<HashMap<String, Vec<Element>>>,
    nested: Mutex<HashMap<(String, String), Vec<Option<String>>>>,
}

impl WatchPage {
    /// Download the watch page at `url`
    #[tracing::instrument(skip(client))]
    pub async fn load(client: Client, url: &str) -> Result<Self, PageError> {
        let response = client
            .get(url)
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to fetch watch page"))?;

        if !response.status().is_success() {
            return Err(PageError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let html = response.text().await?;
        tracing::debug!(bytes = html.len(), "Loaded watch page");

        Ok(Self::from_html(client, url, html))
    }

    pub fn from_html(client: Client, location: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let tracks = caption_tracks(&html);
        Self {
            client,
            location: location.into(),
            html,
            tracks,
            queries: Mutex::default(),
            nested: Mutex::default(),
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, PageError> {
    Selector::parse(selector).map_err(|e| PageError::Selector(format!("{selector}: {e}")))
}

fn to_element(selector: &str, index: usize, node: ElementRef<'_>) -> Element {
    Element {
        handle: format!("{selector}[{index}]"),
        tag: node.value().name().to_string(),
        text: node.text().collect(),
        attributes: node
            .value()
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
    }
}

fn select_all(html: &str, selector: &str) -> Result<Vec<Element>, PageError> {
    let parsed = parse_selector(selector)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&parsed)
        .enumerate()
        .map(|(index, node)| to_element(selector, index, node))
        .collect())
}

fn select_within(html: &str, outer: &str, inner: &str) -> Result<Vec<Option<String>>, PageError> {
    let outer_selector = parse_selector(outer)?;
    let inner_selector = parse_selector(inner)?;
    let document = Html::parse_document(html);

    Ok(document
        .select(&outer_selector)
        .map(|node| {
            node.select(&inner_selector)
                .next()
                .map(|child| child.text().collect::<String>())
        })
        .collect())
}

/// Caption tracks listed in the embedded player response
fn caption_tracks(html: &str) -> Vec<TextTrack> {
    let Some(player_response) = PLAYER_RESPONSE_RE
        .captures(html)
        .and_then(|cap| cap.get(1))
        .and_then(|m| serde_json::from_str::<Value>(m.as_str()).ok())
    else {
        tracing::debug!("No ytInitialPlayerResponse found on page");
        return Vec::new();
    };

    let Some(tracks) = player_response["captions"]["playerCaptionsTracklistRenderer"]["captionTracks"].as_array()
    else {
        return Vec::new();
    };

    tracks
        .iter()
        .enumerate()
        .map(|(index, track)| {
            let label = track["name"]["simpleText"]
                .as_str()
                .or_else(|| track["name"]["runs"][0]["text"].as_str())
                .unwrap_or_default();

            TextTrack {
                index,
                language: track["languageCode"].as_str().unwrap_or_default().to_string(),
                label: label.to_string(),
                source: track["baseUrl"].as_str().map(str::to_string),
            }
        })
        .collect()
}

#[async_trait]
impl VideoPage for WatchPage {
    fn location(&self) -> &str {
        &self.location
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<Element>, PageError> {
        let mut queries = self.queries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = queries.get(selector) {
            return Ok(found.clone());
        }

        let found = select_all(&self.html, selector)?;
        queries.insert(selector.to_string(), found.clone());
        Ok(found)
    }

    async fn query_within(&self, outer: &str, inner: &str) -> Result<Vec<Option<String>>, PageError> {
        let key = (outer.to_string(), inner.to_string());
        let mut nested = self.nested.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(found) = nested.get(&key) {
            return Ok(found.clone());
        }

        let found = select_within(&self.html, outer, inner)?;
        nested.insert(key, found.clone());
        Ok(found)
    }

    async fn activate(&self, element: &Element) -> Result<(), PageError> {
        tracing::debug!(handle = %element.handle, "Static page snapshot ignores activation");
        Ok(())
    }

    async fn text_tracks(&self) -> Result<Vec<TextTrack>, PageError> {
        Ok(self.tracks.clone())
    }

    async fn show_track(&self, track: &TextTrack) -> Result<(), PageError> {
        match self.tracks.iter().any(|t| t.index == track.index) {
            true => Ok(()),
            false => Err(PageError::UnknownElement(format!("text track {}", track.index))),
        }
    }

    async fn track_cues(&self, track: &TextTrack) -> Result<Vec<String>, PageError> {
        let Some(source) = track.source.as_deref() else {
            return Ok(Vec::new());
        };

        let body = self.fetch_text(source).await?;
        Ok(parse_timed_text_segments(&body))
    }

    async fn fetch_text(&self, url: &str) -> Result<String, PageError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, url, "Request failed"))?;

        if !response.status().is_success() {
            return Err(PageError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}
