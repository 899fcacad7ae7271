use anyhow::Context;
use std::path::{Path, PathBuf};

use crate::cli::OutputFormat;
use crate::pipeline::SummaryReport;
use crate::utils::summary_filename;
use crate::Result;

/// Render a summary report in the requested format
pub fn render(report: &SummaryReport, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_as_text(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report).context("Failed to serialize summary"),
    }
}

/// Metadata header followed by the summary
pub fn format_as_text(report: &SummaryReport) -> String {
    format!(
        "{}\nChannel: {}\nLength: {}\n\n{}\n",
        report.metadata.title, report.metadata.channel, report.metadata.duration, report.summary
    )
}

/// Save rendered output to file
pub async fn save_to_file(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, content)?;
    Ok(())
}

/// Print rendered output to console
pub fn print_to_console(content: &str) {
    println!("{}", content.trim_end());
}

/// Export the bare summary as `<title>-summary.txt` inside `dir`
pub async fn export_summary(report: &SummaryReport, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(summary_filename(report.metadata.known_title()));
    save_to_file(&report.summary, &path)
        .await
        .with_context(|| format!("Failed to save summary to {}", path.display()))?;
    Ok(path)
}
