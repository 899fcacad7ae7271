use async_trait::async_trait;

use super::dom_panel::read_segment_panel;
use super::{ExtractionContext, TranscriptStrategy};
use crate::page::settle;
use crate::utils::join_segments;

/// Older transcript UIs render plain `.segment-text` nodes
const ALTERNATE_SEGMENT_SELECTOR: &str = ".segment-text";

/// Clicks a transcript control, then reads whatever panel it opened
pub struct TranscriptButtonStrategy;

#[async_trait]
impl TranscriptStrategy for TranscriptButtonStrategy {
    fn name(&self) -> &'static str {
        "transcript-button"
    }

    async fn try_extract(&self, ctx: &ExtractionContext<'_>) -> Option<String> {
        let buttons = ctx
            .page
            .query_all("button")
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Failed to query buttons"))
            .ok()?;

        let button = buttons.iter().find(|b| b.mentions("transcript"))?;
        tracing::debug!(handle = %button.handle, "Activating transcript button");

        if let Err(e) = ctx.page.activate(button).await {
            tracing::debug!(error = %e, "Failed to activate transcript button");
            return None;
        }

        settle(ctx.config.settle_delay()).await;

        if let Some(transcript) = read_segment_panel(ctx.page).await {
            return Some(transcript);
        }

        let segments = ctx.page.query_all(ALTERNATE_SEGMENT_SELECTOR).await.ok()?;
        let transcript = join_segments(segments.into_iter().map(|s| s.text));
        (!transcript.is_empty()).then_some(transcript)
    }
}
