//! Biodash Analysis Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Pure views over a fetched record set. Nothing here does I/O except
//! [`StatusTaxonomy::load`]; every function is deterministic and total over
//! its input.
//!
//! # Modules
//!
//! - **aggregate**: the seven counting views
//! - **taxonomy**: the conservation-status lists and their name index
//! - **cross_reference**: records matched against the status lists
//! - **license**: licence codes to display metadata
//! - **attribution**: credit lines, provider groups, dataset summary
//! - **filters**: drill-down from a view row to its records
//! - **map_points**: located records for the map
//! - **report**: all of the above in one serializable value
//!
//! # Example
//!
//! ```
//! use biodash_analysis::{Report, ReportOptions, StatusTaxonomy};
//! use biodash_common::Record;
//!
//! let taxonomy = StatusTaxonomy::from_json(
//!     r#"{ "lists": [ { "list": "Red", "species": [
//!         { "name": "X", "scientific": "Aus bus", "annotation": "decl" } ] } ] }"#,
//! )
//! .unwrap();
//! let records = vec![
//!     Record { scientific_name: "Aus bus".into(), ..Default::default() },
//!     Record { vernacular_name: "x".into(), ..Default::default() },
//! ];
//!
//! let report = Report::build(&records, Some(&taxonomy), ReportOptions::default());
//! let red = report.status.unwrap();
//! assert_eq!(red.lists[0].species[0].occurrence_count, 2);
//! ```

pub mod aggregate;
pub mod attribution;
pub mod cross_reference;
pub mod filters;
pub mod license;
pub mod map_points;
pub mod report;
pub mod taxonomy;

pub use aggregate::{aggregate, Aggregates, ClassByMonth, CountRow, SpeciesCount};
pub use cross_reference::{cross_reference, status_breakdown, CrossReference, ListSummary, NOT_LOADED};
pub use filters::Drill;
pub use license::{license_info, LicenseInfo};
pub use map_points::{clamp_max_points, map_points, MapPoints};
pub use report::{Report, ReportOptions};
pub use taxonomy::StatusTaxonomy;
