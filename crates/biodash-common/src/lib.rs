//! Biodash Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, name matching and error handling for the Biodash workspace.
//!
//! # Overview
//!
//! This crate provides the pieces every other Biodash crate depends on:
//!
//! - **Error Handling**: [`BiodashError`] and the crate-wide [`Result`] alias
//! - **Names**: [`names::normalize`], the single canonicalization used for every
//!   species-name comparison
//! - **Types**: the flat [`Record`] every view is computed from
//! - **Logging**: `tracing` subscriber setup shared by the binaries
//!
//! # Example
//!
//! ```
//! use biodash_common::names::normalize;
//!
//! assert_eq!(normalize("  Dáma   DAMA "), "dama dama");
//! ```

pub mod error;
pub mod logging;
pub mod names;
pub mod types;

// Re-export commonly used types
pub use error::{BiodashError, Result};
pub use types::{Record, UNKNOWN};
