use async_trait::async_trait;

use super::{ExtractionContext, TranscriptStrategy};
use crate::page::VideoPage;
use crate::utils::join_segments;

pub(crate) const SEGMENT_SELECTOR: &str = "ytd-transcript-segment-renderer";
pub(crate) const SEGMENT_TEXT_SELECTOR: &str = "#text";

/// Text of an already rendered transcript panel, `None` if there is none
pub async fn read_segment_panel(page: &dyn VideoPage) -> Option<String> {
    let texts = page
        .query_within(SEGMENT_SELECTOR, SEGMENT_TEXT_SELECTOR)
        .await
        .inspect_err(|e| tracing::debug!(error = %e, "Failed to query transcript panel"))
        .ok()?;

    let transcript = join_segments(texts.into_iter().flatten());
    (!transcript.is_empty()).then_some(transcript)
}

/// Reads the transcript panel if the page already shows it
pub struct DomPanelStrategy;

#[async_trait]
impl TranscriptStrategy for DomPanelStrategy {
    fn name(&self) -> &'static str {
        "dom-panel"
    }

    async fn try_extract(&self, ctx: &ExtractionContext<'_>) -> Option<String> {
        read_segment_panel(ctx.page).await
    }
}
