use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use url::Url;

use super::{ExtractionContext, TranscriptStrategy};
use crate::utils::join_segments;

/// Build the captions endpoint URL for a video
pub fn timed_text_url(endpoint: &str, video_id: &str, language: &str) -> Option<String> {
    let mut url = Url::parse(endpoint).ok()?;
    url.query_pairs_mut()
        .append_pair("v", video_id)
        .append_pair("lang", language);
    Some(url.to_string())
}

/// Contents of every `<text>` element, in document order.
///
/// A self-closing `<text/>` yields an empty entry. Parsing stops at the
/// first malformed event and keeps what was read so far.
pub fn parse_timed_text_segments(xml: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut segments = Vec::new();
    let mut current: Option<String> = None;
    // elements nested inside the open <text>
    let mut depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if current.is_some() {
                    depth += 1;
                } else if e.name().as_ref() == b"text" {
                    current = Some(String::new());
                }
            }
            Ok(Event::Empty(e)) => {
                if current.is_none() && e.name().as_ref() == b"text" {
                    segments.push(String::new());
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(buf) = current.as_mut() {
                    match t.unescape() {
                        Ok(text) => buf.push_str(&text),
                        Err(_) => buf.push_str(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(buf) = current.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::End(_)) => {
                if current.is_some() {
                    if depth == 0 {
                        segments.extend(current.take());
                    } else {
                        depth -= 1;
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(error = %e, position = reader.buffer_position(), "Malformed timed-text document");
                break;
            }
        }
    }

    segments
}

/// Caption text of a timed-text document, space-joined and trimmed
pub fn parse_timed_text(xml: &str) -> String {
    join_segments(parse_timed_text_segments(xml))
}

/// Reads the English track straight from the captions endpoint
pub struct TimedTextStrategy;

impl TimedTextStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TimedTextStrategy {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStrategy for TimedTextStrategy {
    fn name(&self) -> &'static str {
        "timed-text"
    }

    async fn try_extract(&self, ctx: &ExtractionContext<'_>) -> Option<String> {
        let url = timed_text_url(&ctx.config.timed_text_url, ctx.video_id, &ctx.config.language)?;

        let body = match ctx.page.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to get transcript from timed-text endpoint");
                return None;
            }
        };

        if body.is_empty() || !body.contains("<text") {
            tracing::debug!(bytes = body.len(), "Timed-text endpoint returned no captions");
            return None;
        }

        Some(parse_timed_text(&body))
    }
}
