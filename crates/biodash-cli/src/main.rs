//! Biodash CLI - Main entry point

use biodash_cli::commands::fetch::FetchArgs;
use biodash_cli::{Cli, Commands};
use biodash_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    let Some(command) = cli.command else {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    };

    // Console only; stdout carries the report
    let level = if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Warn
    };
    let log_config = LogConfig::builder()
        .level(level)
        .output(LogOutput::Console)
        .log_file_prefix("biodash")
        .build();

    // Environment variables take precedence
    let log_config = log_config.merge_env().unwrap_or_else(|_| {
        LogConfig::builder()
            .level(level)
            .output(LogOutput::Console)
            .build()
    });

    // The CLI works without logging
    let _guard = init_logging(&log_config).ok().flatten();

    // Execute command
    if let Err(e) = execute_command(command).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(command: Commands) -> biodash_cli::Result<()> {
    match command {
        Commands::Fetch {
            url,
            taxonomy,
            format,
            drill,
            max_points,
        } => {
            biodash_cli::commands::fetch::run(FetchArgs {
                url,
                taxonomy,
                format,
                drill,
                max_points,
            })
            .await
        },

        Commands::Taxonomy { taxonomy } => biodash_cli::commands::taxonomy::run(taxonomy).await,
    }
}
