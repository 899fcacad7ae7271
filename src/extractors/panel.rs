//! Transcript panel reader
//!
//! Unlike the strategy chain, this reader drives the page UI directly: it
//! opens the transcript panel (through the overflow menu if needed), tries
//! to switch the panel to English and then reads the segments. Failures are
//! reported precisely instead of falling through.

use crate::config::ExtractionConfig;
use crate::page::{settle, wait_for, Element, VideoPage};
use crate::utils::{join_segments, video_id_from_url};
use crate::TranscriptError;

use super::Transcript;

const PANEL_SELECTOR: &str = "ytd-transcript-renderer";
const MENU_ITEM_SELECTOR: &str = "tp-yt-paper-item, ytd-menu-service-item-renderer";
const MORE_ACTIONS_SELECTOR: &str = r#"button[aria-label="More actions"]"#;
const SETTINGS_SELECTORS: [&str; 2] = [
    r#"button[aria-label="Transcript settings"]"#,
    "ytd-transcript-settings-button-renderer button",
];
const LANGUAGE_ITEM_SELECTOR: &str = "ytd-menu-service-item-renderer";

/// Selector families tried in order, `(segment, text inside segment)`.
/// An empty inner selector means the segment itself holds the text.
const SEGMENT_FAMILIES: [(&str, &str); 3] = [
    ("ytd-transcript-segment-renderer", ".segment-text"),
    (".ytd-transcript-segment-list-renderer .segment", ".segment-text"),
    ("yt-formatted-string.ytd-transcript-segment-renderer", ""),
];

pub struct PanelTranscriptReader {
    config: ExtractionConfig,
}

impl PanelTranscriptReader {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    #[tracing::instrument(skip_all, fields(location = page.location()))]
    pub async fn read(&self, page: &dyn VideoPage) -> Result<Transcript, TranscriptError> {
        video_id_from_url(page.location())?;

        let panel_open = page
            .query_all(PANEL_SELECTOR)
            .await
            .map(|found| !found.is_empty())
            .unwrap_or(false);

        if !panel_open {
            self.open_panel(page).await?;

            wait_for(
                page,
                PANEL_SELECTOR,
                self.config.panel_timeout(),
                self.config.poll_interval(),
            )
            .await
            .ok_or(TranscriptError::TranscriptPanelNotFound)?;
        }

        if !self.select_english(page).await {
            tracing::debug!("Could not switch transcript to English, keeping current language");
        }

        let text = self.extract_segments(page).await?;
        tracing::info!(chars = text.len(), "Read transcript panel");

        Ok(Transcript {
            text,
            source: "transcript-panel",
        })
    }

    /// Find the control that opens the panel and activate it
    async fn open_panel(&self, page: &dyn VideoPage) -> Result<(), TranscriptError> {
        let mut control = find_transcript_control(page, "button").await;

        if control.is_none() {
            control = find_transcript_control(page, MENU_ITEM_SELECTOR).await;
        }

        if control.is_none() {
            if let Some(more) = first_match(page, MORE_ACTIONS_SELECTOR).await {
                tracing::debug!("Opening the more actions menu");
                if page.activate(&more).await.is_ok() {
                    settle(self.config.menu_delay()).await;
                    control = find_transcript_control(page, MENU_ITEM_SELECTOR).await;
                }
            }
        }

        let control = control.ok_or_else(|| {
            tracing::debug!("Transcript button not found");
            TranscriptError::TranscriptPanelNotFound
        })?;

        page.activate(&control)
            .await
            .map_err(|_| TranscriptError::TranscriptPanelNotFound)?;
        settle(self.config.settle_delay()).await;

        Ok(())
    }

    /// Switch the panel to English, `false` if no suitable option exists
    async fn select_english(&self, page: &dyn VideoPage) -> bool {
        let mut settings = None;
        for selector in SETTINGS_SELECTORS {
            settings = first_match(page, selector).await;
            if settings.is_some() {
                break;
            }
        }

        let Some(settings) = settings else {
            return false;
        };

        if page.activate(&settings).await.is_err() {
            return false;
        }
        settle(self.config.menu_delay()).await;

        let items = page.query_all(LANGUAGE_ITEM_SELECTOR).await.unwrap_or_default();

        let mut option = items
            .iter()
            .find(|item| item.text.trim().to_lowercase() == "english")
            .or_else(|| items.iter().find(|item| item.text.to_lowercase().contains("english")))
            .cloned();

        if option.is_none() {
            if let Some(translate) = items.iter().find(|item| item.text.to_lowercase().contains("translate")) {
                if page.activate(translate).await.is_ok() {
                    settle(self.config.menu_delay()).await;
                    option = page
                        .query_all(LANGUAGE_ITEM_SELECTOR)
                        .await
                        .unwrap_or_default()
                        .into_iter()
                        .find(|item| item.text.to_lowercase().contains("english"));
                }
            }
        }

        let Some(option) = option else {
            return false;
        };

        match page.activate(&option).await {
            Ok(()) => {
                settle(self.config.settle_delay()).await;
                true
            }
            Err(e) => {
                tracing::debug!(error = %e, "Failed to select English transcript");
                false
            }
        }
    }

    /// Read segment text with the first selector family that matches
    async fn extract_segments(&self, page: &dyn VideoPage) -> Result<String, TranscriptError> {
        for (segment, inner) in SEGMENT_FAMILIES {
            let texts: Vec<String> = if inner.is_empty() {
                page.query_all(segment)
                    .await
                    .unwrap_or_default()
                    .into_iter()
                    .map(|element| element.text)
                    .collect()
            } else {
                page.query_within(segment, inner)
                    .await
                    .unwrap_or_default()
                    .into_iter()
                    .map(Option::unwrap_or_default)
                    .collect()
            };

            if texts.is_empty() {
                continue;
            }

            let joined = join_segments(texts.iter().map(|t| t.trim()));
            if joined.is_empty() {
                tracing::debug!(selector = segment, count = texts.len(), "Transcript segments hold no text");
                continue;
            }

            tracing::debug!(selector = segment, count = texts.len(), "Matched transcript segments");
            return Ok(joined);
        }

        Err(TranscriptError::TranscriptSegmentsNotFound)
    }
}

async fn first_match(page: &dyn VideoPage, selector: &str) -> Option<Element> {
    page.query_all(selector).await.ok()?.into_iter().next()
}

async fn find_transcript_control(page: &dyn VideoPage, selector: &str) -> Option<Element> {
    page.query_all(selector)
        .await
        .ok()?
        .into_iter()
        .find(|element| {
            let text = element.text.to_lowercase();
            text.contains("show transcript") || text.contains("open transcript")
        })
}
