use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::utils::mask_secret;
use crate::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Completion API key, set with `yt-digest config set-key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Completion API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Transcript extraction settings
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the provider, `/completions` is appended
    pub base_url: String,

    /// Model name sent with every request
    pub model: String,

    pub max_tokens: u32,

    pub temperature: f32,

    /// Nucleus sampling threshold
    pub top_p: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Captions endpoint queried before touching the page
    pub timed_text_url: String,

    /// Caption language requested from the endpoint
    pub language: String,

    /// Pause after activating a control or a text track
    pub settle_delay_ms: u64,

    /// Pause after opening a menu
    pub menu_delay_ms: u64,

    /// How long to wait for the transcript panel to appear
    pub panel_timeout_ms: u64,

    /// Polling interval while waiting for the panel
    pub poll_interval_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.together.xyz/v1".to_string(),
            model: "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free".to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            top_p: 0.9,
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            timed_text_url: "https://www.youtube.com/api/timedtext".to_string(),
            language: "en".to_string(),
            settle_delay_ms: 1000,
            menu_delay_ms: 500,
            panel_timeout_ms: 3000,
            poll_interval_ms: 100,
        }
    }
}

impl ExtractionConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn menu_delay(&self) -> Duration {
        Duration::from_millis(self.menu_delay_ms)
    }

    pub fn panel_timeout(&self) -> Duration {
        Duration::from_millis(self.panel_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Same settings with every delay removed
    pub fn without_delays(mut self) -> Self {
        self.settle_delay_ms = 0;
        self.menu_delay_ms = 0;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api: ApiConfig::default(),
            extraction: ExtractionConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub async fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("yt-digest").join("config.yaml"))
    }

    /// Store a new API key
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            anyhow::bail!("Please enter a valid API key");
        }
        self.api_key = Some(key.to_string());
        Ok(())
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;

        Url::parse(&self.extraction.timed_text_url)
            .with_context(|| format!("Invalid extraction.timed_text_url: {}", self.extraction.timed_text_url))?;

        if self.api.max_tokens == 0 {
            anyhow::bail!("api.max_tokens must be greater than zero");
        }

        if !(0.0..=2.0).contains(&self.api.temperature) {
            anyhow::bail!("api.temperature must be between 0 and 2");
        }

        if !(0.0..=1.0).contains(&self.api.top_p) {
            anyhow::bail!("api.top_p must be between 0 and 1");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        match &self.api_key {
            Some(key) => println!("  API Key: {}", mask_secret(key)),
            None => println!("  API Key: (not set)"),
        }
        println!("  API Base URL: {}", self.api.base_url);
        println!("  Model: {}", self.api.model);
        println!(
            "  Generation: max_tokens={} temperature={} top_p={}",
            self.api.max_tokens, self.api.temperature, self.api.top_p
        );
        println!("  Caption Language: {}", self.extraction.language);
        println!("  Settle Delay: {}ms", self.extraction.settle_delay_ms);
        println!("  Panel Timeout: {}ms", self.extraction.panel_timeout_ms);
    }
}
