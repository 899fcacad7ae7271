use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned no completion")]
    EmptyCompletion,
}

/// Turns transcript text into a summary
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, transcript: &str) -> Result<String, SummarizeError>;
}

/// Client for an OpenAI-style `/completions` endpoint
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    pub model: &'a str,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

#[derive(Debug, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub id: Option<String>,
    pub choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionChoice {
    pub text: String,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl CompletionClient {
    const INSTRUCTIONS: &str = include_str!("./prompts/summary.txt");

    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_config(&ApiConfig::default(), api_key)
    }

    pub fn from_config(config: &ApiConfig, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Prompt asking for translation (if needed) and a summary
    pub fn build_prompt(transcript: &str) -> String {
        format!(
            "{}\n\nTranscript:\n{}\n\nSummary:",
            Self::INSTRUCTIONS.trim_end(),
            transcript
        )
    }

    pub fn request_body(&self, transcript: &str) -> CompletionRequest<'_> {
        CompletionRequest {
            model: &self.model,
            prompt: Self::build_prompt(transcript),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            top_p: self.top_p,
        }
    }

    pub async fn send_completion_request(&self, transcript: &str) -> Result<CompletionResponse, SummarizeError> {
        let body = self.request_body(transcript);

        let resp = self
            .client
            .post(format!("{}/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to make http request"))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = error_payload(&resp.text().await?);
            return Err(SummarizeError::Api { status, message });
        }

        Ok(resp.json::<CompletionResponse>().await?)
    }
}

/// Error body as compact JSON when it parses, otherwise verbatim
fn error_payload(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .map(|value| value.to_string())
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl Summarizer for CompletionClient {
    #[tracing::instrument(skip_all, fields(model = %self.model, chars = transcript.len()))]
    async fn summarize(&self, transcript: &str) -> Result<String, SummarizeError> {
        let response = self
            .send_completion_request(transcript)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to summarize transcript"))?;

        tracing::debug!(id = ?response.id, "Received completion");

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text.trim().to_string())
            .ok_or(SummarizeError::EmptyCompletion)
    }
}
