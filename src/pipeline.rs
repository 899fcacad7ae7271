use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ExtractionConfig;
use crate::extractors::{panel::PanelTranscriptReader, Transcript, TranscriptExtractor};
use crate::metadata::{self, VideoMetadata};
use crate::page::VideoPage;
use crate::summarize::Summarizer;
use crate::utils::video_id_from_url;
use crate::TranscriptError;

/// Everything produced by one summarize run
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub video_id: String,
    pub url: String,
    pub metadata: VideoMetadata,
    pub summary: String,
    /// Strategy that produced the transcript
    pub transcript_source: &'static str,
    pub transcript_chars: usize,
    pub generated_at: DateTime<Utc>,
}

/// How the transcript is pulled out of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// Strategy chain, first non-empty result wins
    #[default]
    Waterfall,
    /// Drive the transcript panel directly
    Panel,
}

/// Page → transcript → summary
pub struct DigestPipeline<S: Summarizer> {
    extractor: TranscriptExtractor,
    panel_reader: PanelTranscriptReader,
    summarizer: S,
    mode: ExtractionMode,
}

impl<S: Summarizer> DigestPipeline<S> {
    pub fn new(config: ExtractionConfig, summarizer: S) -> Self {
        Self {
            extractor: TranscriptExtractor::new(config.clone()),
            panel_reader: PanelTranscriptReader::new(config),
            summarizer,
            mode: ExtractionMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: ExtractionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Extract the transcript with the configured mode
    pub async fn transcript(&self, page: &dyn VideoPage) -> Result<Transcript, TranscriptError> {
        match self.mode {
            ExtractionMode::Waterfall => self.extractor.extract(page).await,
            ExtractionMode::Panel => self.panel_reader.read(page).await,
        }
    }

    /// Run the whole pipeline against an open page
    #[tracing::instrument(skip_all, fields(location = page.location(), mode = ?self.mode))]
    pub async fn run(&self, page: &dyn VideoPage) -> Result<SummaryReport> {
        let video_id = video_id_from_url(page.location())?;

        let metadata = metadata::scrape(page).await;
        tracing::info!(title = %metadata.title, channel = %metadata.channel, "Processing video");

        let transcript = self.transcript(page).await?;

        let summary = self.summarizer.summarize(&transcript.text).await?;

        Ok(SummaryReport {
            video_id,
            url: page.location().to_string(),
            metadata,
            summary,
            transcript_source: transcript.source,
            transcript_chars: transcript.text.chars().count(),
            generated_at: Utc::now(),
        })
    }
}
