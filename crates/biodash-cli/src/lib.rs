//! Biodash CLI Library
//!
//! Command-line dashboard for biological occurrence records.
//!
//! # Overview
//!
//! - **Fetch**: pull every page of an occurrence search and print the
//!   dashboard report (`biodash fetch`)
//! - **Drill-down**: print the records behind one row of a view
//!   (`biodash fetch --drill KIND=VALUE`)
//! - **Taxonomy**: show the conservation-status reference lists
//!   (`biodash taxonomy`)

pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod session;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use output::OutputFormat;
pub use session::{FetchOutcome, FetchTicket, Session};

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Biodash - biological records dashboard
#[derive(Parser, Debug)]
#[command(name = "biodash")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print the CLI reference as Markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch records and print the dashboard report
    Fetch {
        /// Occurrence search URL (defaults to BIODASH_API_URL)
        url: Option<String>,

        /// Conservation-status taxonomy file (defaults to BIODASH_TAXONOMY or ./bocc.json)
        #[arg(short, long)]
        taxonomy: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Print the records behind one view row instead of the report
        /// (month, species, class, basis, provider, month-class, status, list)
        #[arg(short, long, value_name = "KIND=VALUE")]
        drill: Option<String>,

        /// Maximum map points (100-20000)
        #[arg(long)]
        max_points: Option<usize>,
    },

    /// Show the conservation-status reference lists
    Taxonomy {
        /// Taxonomy file (defaults to BIODASH_TAXONOMY or ./bocc.json)
        #[arg(short, long)]
        taxonomy: Option<PathBuf>,
    },
}
