use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "yt-digest",
    about = "Summarize YouTube videos from their captions",
    version,
    long_about = "Pulls the transcript of a YouTube video (captions endpoint, transcript panel or caption tracks) and summarizes it with a hosted language model."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize a video
    Summarize {
        /// Watch page URL, e.g. https://www.youtube.com/watch?v=...
        #[arg(value_name = "URL")]
        url: String,

        /// API key for the completion endpoint (overrides the saved key)
        #[arg(long, env = "TOGETHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Model to use instead of the configured one
        #[arg(short, long)]
        model: Option<String>,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also save the summary as `<title>-summary.txt`
        #[arg(long)]
        save: bool,

        /// Directory used by --save
        #[arg(long, value_name = "DIR", default_value = ".")]
        save_dir: PathBuf,

        /// Open and read the transcript panel instead of the strategy chain
        #[arg(long)]
        via_panel: bool,
    },

    /// Print the transcript of a video
    Transcript {
        /// Watch page URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Open and read the transcript panel instead of the strategy chain
        #[arg(long)]
        via_panel: bool,
    },

    /// Manage the API key and settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Save the completion API key
    SetKey {
        /// The key, stored as-is in the config file
        key: String,
    },

    /// Show current configuration
    Show,

    /// Print the config file location
    Path,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON report with metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
