use async_trait::async_trait;
use serde::Serialize;

pub mod dom_panel;
pub mod panel;
pub mod text_tracks;
pub mod timedtext;
pub mod transcript_button;

use crate::config::ExtractionConfig;
use crate::page::VideoPage;
use crate::utils::video_id_from_url;
use crate::TranscriptError;

/// A transcript and the strategy that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transcript {
    pub text: String,
    pub source: &'static str,
}

/// What a strategy gets to work with
pub struct ExtractionContext<'a> {
    pub page: &'a dyn VideoPage,
    pub video_id: &'a str,
    pub config: &'a ExtractionConfig,
}

/// One way of getting caption text out of a video page.
///
/// Strategies never fail: anything that goes wrong is logged and reported
/// as `None` so the next strategy gets its turn.
#[async_trait]
pub trait TranscriptStrategy: Send + Sync {
    /// Short name used in logs and reports
    fn name(&self) -> &'static str;

    /// Non-empty transcript text, or `None` to fall through
    async fn try_extract(&self, ctx: &ExtractionContext<'_>) -> Option<String>;
}

/// Ordered chain of strategies, first non-empty result wins
pub struct TranscriptExtractor {
    config: ExtractionConfig,
    strategies: Vec<Box<dyn TranscriptStrategy>>,
}

impl TranscriptExtractor {
    /// Create an extractor with the default strategy chain
    pub fn new(config: ExtractionConfig) -> Self {
        let mut extractor = Self::empty(config);

        extractor.register(Box::new(timedtext::TimedTextStrategy::new()));
        extractor.register(Box::new(dom_panel::DomPanelStrategy));
        extractor.register(Box::new(text_tracks::TextTrackStrategy));
        extractor.register(Box::new(transcript_button::TranscriptButtonStrategy));

        extractor
    }

    /// Create an extractor with no strategies
    pub fn empty(config: ExtractionConfig) -> Self {
        Self {
            config,
            strategies: Vec::new(),
        }
    }

    /// Append a strategy to the end of the chain
    pub fn register(&mut self, strategy: Box<dyn TranscriptStrategy>) {
        self.strategies.push(strategy);
    }

    /// Names of the registered strategies, in the order they run
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    #[tracing::instrument(skip_all, fields(location = page.location()))]
    pub async fn extract(&self, page: &dyn VideoPage) -> Result<Transcript, TranscriptError> {
        let video_id = video_id_from_url(page.location())?;

        let ctx = ExtractionContext {
            page,
            video_id: &video_id,
            config: &self.config,
        };

        for strategy in &self.strategies {
            tracing::debug!(strategy = strategy.name(), "Trying transcript strategy");

            match strategy.try_extract(&ctx).await {
                Some(text) if !text.is_empty() => {
                    tracing::info!(
                        strategy = strategy.name(),
                        chars = text.len(),
                        "Extracted transcript"
                    );
                    return Ok(Transcript {
                        text,
                        source: strategy.name(),
                    });
                }
                _ => tracing::debug!(strategy = strategy.name(), "Strategy produced nothing"),
            }
        }

        tracing::warn!(%video_id, "All transcript strategies exhausted");
        Err(TranscriptError::TranscriptUnavailable)
    }
}
