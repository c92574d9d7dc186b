//! Pagination state machine for the occurrence search API
//!
//! The paginator owns the accumulated occurrences and decides which page to
//! request next; it does no I/O. The HTTP client drives it:
//!
//! ```text
//! Idle --next_request--> FetchingPage(n) --apply_page--> FetchingPage(n+1) ... --> Done
//!                               |                                  |
//!                               +--cancel--> Cancelled             +--cap/failure--> Failed
//! ```
//!
//! A page reports `totalRecords` and `pageSize`; when either is missing the
//! previously known value is kept, and a missing total falls back to the
//! number of occurrences accumulated so far, which ends the loop.

use crate::config::FetchConfig;
use crate::models::{OccurrencePage, RawOccurrence};
use biodash_common::{BiodashError, Result};
use reqwest::Url;

/// Where a fetch is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Idle,
    /// Waiting on page `n` (1-based)
    FetchingPage(usize),
    Done,
    Cancelled,
    Failed,
}

/// Repair, then parse, a user-supplied base URL.
///
/// A common typo of the scheme (`htts://`) is fixed before parsing.
pub fn normalize_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let repaired = match trimmed.get(..7) {
        Some(scheme) if scheme.eq_ignore_ascii_case("htts://") => {
            format!("https://{}", &trimmed[7..])
        },
        _ => trimmed.to_string(),
    };

    Url::parse(&repaired).map_err(|e| BiodashError::InvalidUrl(format!("{}: {}", raw.trim(), e)))
}

/// Set `key=value` in the query string.
///
/// The first existing `key` is replaced in place and any later duplicates are
/// dropped; otherwise the pair is appended. Other parameters keep their order.
pub fn upsert_query_param(url: &mut Url, key: &str, value: &str) {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter_map(|(k, v)| {
            if k != key {
                return Some((k.into_owned(), v.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((k.into_owned(), value.to_string()))
        })
        .collect();

    let mut query = url.query_pairs_mut();
    query.clear();
    query.extend_pairs(&pairs);
    if !replaced {
        query.append_pair(key, value);
    }
}

/// Accumulates pages of occurrences until the reported total is reached.
#[derive(Debug)]
pub struct Paginator {
    url: Url,
    page_size: usize,
    max_pages: usize,
    start_index: usize,
    /// `None` until the first page reports a total
    total: Option<usize>,
    pages: usize,
    occurrences: Vec<RawOccurrence>,
    state: FetchState,
}

impl Paginator {
    /// Prepare a fetch of `base_url` sorted newest first.
    pub fn new(base_url: &str, config: &FetchConfig) -> Result<Self> {
        let mut url = normalize_base_url(base_url)?;
        let page_size = config.page_size.max(1);

        upsert_query_param(&mut url, "sort", "occurrence_date");
        upsert_query_param(&mut url, "dir", "desc");
        upsert_query_param(&mut url, "pageSize", &page_size.to_string());
        upsert_query_param(&mut url, "startIndex", "0");

        Ok(Self {
            url,
            page_size,
            max_pages: config.max_pages,
            start_index: 0,
            total: None,
            pages: 0,
            occurrences: Vec::new(),
            state: FetchState::Idle,
        })
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    pub fn start_index(&self) -> usize {
        self.start_index
    }

    pub fn accumulated(&self) -> usize {
        self.occurrences.len()
    }

    /// True while the reported total has not been reached.
    pub fn has_more(&self) -> bool {
        match self.total {
            None => true,
            Some(total) => self.start_index < total,
        }
    }

    /// URL of the next page, or `None` once the total is reached.
    ///
    /// Returns `None` without changing state after a cancellation or failure.
    pub fn next_request(&mut self) -> Option<Url> {
        match self.state {
            FetchState::Cancelled | FetchState::Failed | FetchState::Done => return None,
            FetchState::Idle | FetchState::FetchingPage(_) => {},
        }

        if !self.has_more() {
            self.state = FetchState::Done;
            return None;
        }

        let mut url = self.url.clone();
        upsert_query_param(&mut url, "startIndex", &self.start_index.to_string());
        self.state = FetchState::FetchingPage(self.pages + 1);
        Some(url)
    }

    /// Fold a received page into the accumulator and advance.
    ///
    /// Fails with [`BiodashError::CapExceeded`] once more than `max_pages`
    /// pages have been received.
    pub fn apply_page(&mut self, page: OccurrencePage) -> Result<()> {
        let total = page.total_records();
        let page_size = page.page_size();
        self.occurrences.extend(page.into_occurrences());

        self.total = Some(total.unwrap_or(self.occurrences.len()));
        if let Some(size) = page_size {
            self.page_size = size;
        }
        self.start_index = self.start_index.saturating_add(self.page_size);
        self.pages += 1;

        if self.pages > self.max_pages {
            self.state = FetchState::Failed;
            return Err(BiodashError::CapExceeded {
                max_pages: self.max_pages,
            });
        }

        Ok(())
    }

    pub fn cancel(&mut self) {
        self.state = FetchState::Cancelled;
    }

    pub fn fail(&mut self) {
        self.state = FetchState::Failed;
    }

    /// Status line shown before a page request.
    pub fn fetching_message(&self) -> String {
        format!("Fetching… startIndex={}", self.start_index)
    }

    /// Status line shown after a page arrives.
    pub fn fetched_message(&self) -> String {
        let total = self
            .total
            .map(|t| t.to_string())
            .unwrap_or_else(|| "?".to_string());
        format!(
            "Fetched page {} ({}/{})",
            self.pages,
            self.occurrences.len(),
            total
        )
    }

    /// The complete occurrence list. Only meaningful once [`FetchState::Done`].
    pub fn into_occurrences(self) -> Vec<RawOccurrence> {
        self.occurrences
    }
}
