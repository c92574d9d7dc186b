//! Session state for one dashboard run
//!
//! The session owns the record set, the status taxonomy and the handle of
//! the fetch in flight. Views are computed from it on demand and never
//! cached.
//!
//! Every fetch is issued a [`FetchTicket`]. Beginning a new fetch cancels the
//! previous one and bumps the generation, so a result that arrives for an old
//! ticket is discarded instead of replacing newer records.

use biodash_analysis::{Drill, Report, ReportOptions, StatusTaxonomy};
use biodash_common::{BiodashError, Record, Result};
use biodash_ingest::{map_all, RawOccurrence};
use chrono::{DateTime, Utc};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle for one fetch
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    cancel: CancellationToken,
}

impl FetchTicket {
    /// Token to pass to the ingest client
    pub fn token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What became of a completed fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The records were replaced with this many new ones
    Loaded(usize),
    /// Cancelled before completion; records unchanged
    Cancelled,
    /// A newer fetch superseded this one; result discarded
    Stale,
}

#[derive(Debug, Default)]
pub struct Session {
    records: Vec<Record>,
    taxonomy: Option<StatusTaxonomy>,
    taxonomy_error: Option<String>,
    generation: u64,
    in_flight: Option<CancellationToken>,
    source_url: Option<String>,
    fetched_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the status taxonomy from `path`.
    ///
    /// A failure is kept as the session's taxonomy error and every status
    /// view falls back to the not-loaded placeholder.
    pub fn load_taxonomy(&mut self, path: &Path) -> bool {
        match StatusTaxonomy::load(path) {
            Ok(taxonomy) => {
                self.set_taxonomy(taxonomy);
                true
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Status taxonomy not loaded");
                self.taxonomy = None;
                self.taxonomy_error = Some(e.to_string());
                false
            },
        }
    }

    pub fn set_taxonomy(&mut self, taxonomy: StatusTaxonomy) {
        self.taxonomy = Some(taxonomy);
        self.taxonomy_error = None;
    }

    pub fn taxonomy(&self) -> Option<&StatusTaxonomy> {
        self.taxonomy.as_ref()
    }

    pub fn taxonomy_error(&self) -> Option<&str> {
        self.taxonomy_error.as_deref()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    /// True while a fetch ticket is outstanding
    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start a fetch, cancelling any fetch still in flight.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        if let Some(previous) = self.in_flight.take() {
            debug!(generation = self.generation, "Superseding fetch in flight");
            previous.cancel();
        }

        self.generation += 1;
        let cancel = CancellationToken::new();
        self.in_flight = Some(cancel.clone());

        FetchTicket {
            generation: self.generation,
            cancel,
        }
    }

    /// Cancel the fetch in flight, if any.
    pub fn cancel_fetch(&self) {
        if let Some(token) = &self.in_flight {
            token.cancel();
        }
    }

    /// Commit the result of the fetch identified by `ticket`.
    ///
    /// Records are replaced only on success of the current fetch. Errors of
    /// the current fetch are returned; errors of a stale fetch are dropped.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        source_url: &str,
        result: Result<Vec<RawOccurrence>>,
    ) -> Result<FetchOutcome> {
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale fetch result"
            );
            return Ok(FetchOutcome::Stale);
        }
        self.in_flight = None;

        match result {
            Ok(raw) => {
                self.records = map_all(&raw);
                self.source_url = Some(source_url.to_string());
                self.fetched_at = Some(Utc::now());
                info!(records = self.records.len(), "Records loaded");
                Ok(FetchOutcome::Loaded(self.records.len()))
            },
            Err(BiodashError::Cancelled) => Ok(FetchOutcome::Cancelled),
            Err(e) => Err(e),
        }
    }

    /// Every view of the current records
    pub fn report(&self, options: ReportOptions) -> Report {
        Report::build(&self.records, self.taxonomy(), options)
    }

    /// The records behind one view row
    pub fn drill(&self, drill: &Drill) -> Vec<&Record> {
        drill.apply(&self.records, self.taxonomy())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use biodash_ingest::OccurrencePage;
    use serde_json::json;
    use std::io::Write;

    fn raw(names: &[&str]) -> Vec<RawOccurrence> {
        let occurrences: Vec<_> = names
            .iter()
            .enumerate()
            .map(|(i, name)| json!({ "uuid": format!("u{}", i), "scientificName": name }))
            .collect();
        OccurrencePage::from_value(json!({ "totalRecords": names.len(), "occurrences": occurrences })).into_occurrences()
    }

    #[test]
    fn test_loads_current_fetch() {
        let mut session = Session::new();
        let ticket = session.begin_fetch();
        assert!(session.is_fetching());

        let outcome = session
            .complete_fetch(ticket, "https://x.org/s", Ok(raw(&["Vulpes vulpes", "Meles meles"])))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Loaded(2));
        assert_eq!(session.records()[1].species_key, "meles meles");
        assert_eq!(session.source_url(), Some("https://x.org/s"));
        assert!(session.fetched_at().is_some());
        assert!(!session.is_fetching());
    }

    #[test]
    fn test_new_fetch_cancels_and_supersedes_old() {
        let mut session = Session::new();
        let first = session.begin_fetch();
        let second = session.begin_fetch();
        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());
        assert_eq!(second.generation(), first.generation() + 1);

        let outcome = session
            .complete_fetch(second, "https://x.org/new", Ok(raw(&["Vulpes vulpes"])))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Loaded(1));

        // The old fetch finishing late changes nothing
        let late = session
            .complete_fetch(first, "https://x.org/old", Ok(raw(&["A", "B", "C"])))
            .unwrap();
        assert_eq!(late, FetchOutcome::Stale);
        assert_eq!(session.records().len(), 1);
        assert_eq!(session.source_url(), Some("https://x.org/new"));
    }

    #[test]
    fn test_cancel_and_error_keep_records() {
        let mut session = Session::new();
        let ticket = session.begin_fetch();
        session
            .complete_fetch(ticket, "https://x.org/s", Ok(raw(&["Vulpes vulpes"])))
            .unwrap();

        let ticket = session.begin_fetch();
        session.cancel_fetch();
        assert!(ticket.token().is_cancelled());
        let outcome = session
            .complete_fetch(ticket, "https://x.org/s", Err(BiodashError::Cancelled))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Cancelled);
        assert_eq!(session.records().len(), 1);

        let ticket = session.begin_fetch();
        let err = session
            .complete_fetch(ticket, "https://x.org/s", Err(BiodashError::CapExceeded { max_pages: 400 }))
            .unwrap_err();
        assert!(matches!(err, BiodashError::CapExceeded { max_pages: 400 }));
        assert_eq!(session.records().len(), 1);
    }

    #[test]
    fn test_stale_error_is_dropped() {
        let mut session = Session::new();
        let first = session.begin_fetch();
        let _second = session.begin_fetch();
        let outcome = session
            .complete_fetch(first, "https://x.org/s", Err(BiodashError::Transport("reset".into())))
            .unwrap();
        assert_eq!(outcome, FetchOutcome::Stale);
    }

    #[test]
    fn test_taxonomy_load_failure_is_kept() {
        let mut session = Session::new();
        assert!(!session.load_taxonomy(Path::new("/nonexistent/bocc.json")));
        assert!(session.taxonomy().is_none());
        assert!(session.taxonomy_error().unwrap().contains("/nonexistent/bocc.json"));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "lists": [ {{ "list": "Red", "species": [ {{ "name": "Curlew", "scientific": "Numenius arquata" }} ] }} ] }}"#
        )
        .unwrap();
        assert!(session.load_taxonomy(file.path()));
        assert!(session.taxonomy_error().is_none());
    }

    #[test]
    fn test_report_and_drill_use_current_records() {
        let mut session = Session::new();
        session.set_taxonomy(
            StatusTaxonomy::from_json(
                r#"{ "lists": [ { "list": "Red", "species": [ { "name": "Curlew", "scientific": "Numenius arquata" } ] } ] }"#,
            )
            .unwrap(),
        );
        let ticket = session.begin_fetch();
        session
            .complete_fetch(ticket, "https://x.org/s", Ok(raw(&["Numenius arquata", "Vulpes vulpes"])))
            .unwrap();

        let report = session.report(ReportOptions::default());
        assert_eq!(report.total_records, 2);
        assert!(report.status.is_some());

        let red = session.drill(&"list=Red".parse().unwrap());
        assert_eq!(red.len(), 1);
        assert_eq!(red[0].uuid, "u0");
    }
}
