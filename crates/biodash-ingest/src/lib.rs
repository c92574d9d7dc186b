//! Biodash Ingest Library
//!
//! Fetches occurrence records from a paginated search endpoint and flattens
//! them into [`biodash_common::Record`]s.
//!
//! # Modules
//!
//! - **client**: HTTP fetch loop with progress reporting and cancellation
//! - **paginator**: page bookkeeping and the page safety cap
//! - **models**: lenient wire types for the API's JSON
//! - **mapper**: raw occurrence to [`biodash_common::Record`]
//! - **config**: page size, page cap and timeout
//!
//! # Example
//!
//! ```no_run
//! use biodash_ingest::{map_all, FetchConfig, OccurrenceClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = OccurrenceClient::new(FetchConfig::default())?;
//!     let raw = client
//!         .fetch_all(
//!             "https://records-ws.nbnatlas.org/occurrences/search?q=*:*",
//!             |status| eprintln!("{status}"),
//!             &CancellationToken::new(),
//!         )
//!         .await?;
//!     let records = map_all(&raw);
//!     println!("{} records", records.len());
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod mapper;
pub mod models;
pub mod paginator;

pub use client::OccurrenceClient;
pub use config::FetchConfig;
pub use mapper::{map_all, map_occurrence};
pub use models::{OccurrencePage, RawOccurrence};
pub use paginator::{FetchState, Paginator};
