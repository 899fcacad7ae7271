//! yt-digest - summarize YouTube videos from their captions
//!
//! This library pulls the transcript of a YouTube video through a chain of
//! extraction strategies (timed-text endpoint, transcript panel, media text
//! tracks, transcript button) and hands it to a hosted completion API.

pub mod cli;
pub mod config;
pub mod extractors;
pub mod metadata;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod summarize;
pub mod utils;

pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{panel::PanelTranscriptReader, Transcript, TranscriptExtractor, TranscriptStrategy};
pub use metadata::VideoMetadata;
pub use page::{VideoPage, WatchPage};
pub use pipeline::{DigestPipeline, SummaryReport};
pub use summarize::{CompletionClient, SummarizeError, Summarizer};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;

/// Failures of transcript extraction
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TranscriptError {
    #[error("Not a YouTube video page")]
    NotAVideoPage,

    #[error("Could not find video ID")]
    VideoIdMissing,

    #[error("Could not extract transcript using any available method")]
    TranscriptUnavailable,

    #[error("Transcript panel did not open")]
    TranscriptPanelNotFound,

    #[error("Could not find transcript segments")]
    TranscriptSegmentsNotFound,
}
