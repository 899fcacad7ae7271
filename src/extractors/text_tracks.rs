use async_trait::async_trait;

use super::{ExtractionContext, TranscriptStrategy};
use crate::page::settle;
use crate::utils::join_segments;

/// Reads cues from the first English text track of the video element
pub struct TextTrackStrategy;

#[async_trait]
impl TranscriptStrategy for TextTrackStrategy {
    fn name(&self) -> &'static str {
        "text-tracks"
    }

    async fn try_extract(&self, ctx: &ExtractionContext<'_>) -> Option<String> {
        let tracks = ctx
            .page
            .text_tracks()
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Failed to list text tracks"))
            .ok()?;

        let track = tracks.iter().find(|t| t.is_english())?;
        tracing::debug!(language = %track.language, label = %track.label, "Using text track");

        if let Err(e) = ctx.page.show_track(track).await {
            tracing::debug!(error = %e, "Failed to activate text track");
            return None;
        }

        // cues load asynchronously once the track is showing
        settle(ctx.config.settle_delay()).await;

        let cues = ctx
            .page
            .track_cues(track)
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "Failed to read track cues"))
            .ok()?;

        let transcript = join_segments(cues);
        (!transcript.is_empty()).then_some(transcript)
    }
}
