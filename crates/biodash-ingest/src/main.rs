//! Biodash Ingest - fetch occurrence records to a JSON file

use anyhow::{Context, Result};
use biodash_common::logging::{init_logging, LogConfig, LogLevel};
use biodash_ingest::{map_all, OccurrenceClient};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "biodash-ingest")]
#[command(author, version, about = "Fetch occurrence records to a JSON file")]
struct Cli {
    /// Occurrence search URL (query parameters are kept)
    url: String,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Write the API's occurrences unmapped
    #[arg(long)]
    raw: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };

    // Environment variables take precedence over flags
    let log_config = LogConfig::builder()
        .level(log_level)
        .log_file_prefix("biodash-ingest")
        .build()
        .merge_env()?;
    let _guard = init_logging(&log_config)?;

    let client = OccurrenceClient::from_env()?;

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let result = client
        .fetch_all(&cli.url, |status| spinner.set_message(status.to_string()), &cancel)
        .await;
    spinner.finish_and_clear();

    let raw = match result {
        Ok(raw) => raw,
        Err(e) if e.is_cancelled() => {
            eprintln!("Cancelled.");
            return Ok(());
        },
        Err(e) => return Err(e).context("Fetch failed"),
    };

    let json = if cli.raw {
        serde_json::to_string_pretty(&raw)?
    } else {
        serde_json::to_string_pretty(&map_all(&raw))?
    };
    std::fs::write(&cli.output, json)
        .with_context(|| format!("Failed to write {}", cli.output.display()))?;

    info!(records = raw.len(), output = %cli.output.display(), "Ingestion complete");
    println!("Wrote {} records to {}", raw.len(), cli.output.display());
    Ok(())
}
