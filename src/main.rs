use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yt_digest::cli::{Cli, Commands, ConfigAction};
use yt_digest::pipeline::ExtractionMode;
use yt_digest::{
    output, utils, CompletionClient, Config, DigestPipeline, PanelTranscriptReader, TranscriptExtractor, WatchPage,
};

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "yt_digest=debug" } else { "yt_digest=info" };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("yt-digest/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

fn spinner(quiet: bool, message: &'static str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn mode(via_panel: bool) -> ExtractionMode {
    if via_panel {
        ExtractionMode::Panel
    } else {
        ExtractionMode::Waterfall
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load().await?;

    match cli.command {
        Commands::Summarize {
            url,
            api_key,
            model,
            output,
            format,
            save,
            save_dir,
            via_panel,
        } => {
            let api_key = api_key
                .or_else(|| config.api_key.clone())
                .filter(|key| !key.trim().is_empty())
                .context("Please enter your Together.ai API key (yt-digest config set-key <KEY> or TOGETHER_API_KEY)")?;

            // reject bad URLs before any request goes out
            utils::video_id_from_url(&url)?;

            let client = http_client()?;
            let mut summarizer = CompletionClient::from_config(&config.api, api_key).with_client(client.clone());
            if let Some(model) = model {
                summarizer = summarizer.with_model(model);
            }

            let progress = spinner(cli.quiet, "Fetching video page...");
            let page = WatchPage::load(client, &url).await?;

            progress.set_message("Extracting transcript and summarizing...");
            let pipeline = DigestPipeline::new(config.extraction.clone(), summarizer).with_mode(mode(via_panel));
            let result = pipeline.run(&page).await;
            progress.finish_and_clear();
            let report = result?;

            let rendered = output::render(&report, &format)?;
            match output {
                Some(path) => {
                    output::save_to_file(&rendered, &path).await?;
                    println!("Summary saved to: {}", path.display());
                }
                None => output::print_to_console(&rendered),
            }

            if save {
                let path = output::export_summary(&report, &save_dir).await?;
                println!("Summary exported to: {}", path.display());
            }
        }
        Commands::Transcript { url, output, via_panel } => {
            utils::video_id_from_url(&url)?;

            let page = WatchPage::load(http_client()?, &url).await?;
            let transcript = match mode(via_panel) {
                ExtractionMode::Waterfall => TranscriptExtractor::new(config.extraction.clone()).extract(&page).await?,
                ExtractionMode::Panel => PanelTranscriptReader::new(config.extraction.clone()).read(&page).await?,
            };
            tracing::debug!(source = transcript.source, "Transcript ready");

            match output {
                Some(path) => {
                    output::save_to_file(&transcript.text, &path).await?;
                    println!("Transcript saved to: {}", path.display());
                }
                None => output::print_to_console(&transcript.text),
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::SetKey { key } => {
                let mut config = config;
                config.set_api_key(&key)?;
                let path = config.save().await?;
                println!("API key saved successfully ({})", path.display());
            }
            ConfigAction::Show => config.display(),
            ConfigAction::Path => println!("{}", Config::config_path()?.display()),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", console::style(format!("Error: {e:#}")).red().for_stderr());
            ExitCode::FAILURE
        }
    }
}
