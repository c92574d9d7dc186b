//! HTTP client for the occurrence search API
//!
//! Drives a [`Paginator`] over the network, one page at a time. A fetch can be
//! cancelled through a [`CancellationToken`]: the in-flight request is dropped
//! and no further page is requested. Partial results are never returned.

use crate::config::FetchConfig;
use crate::models::{OccurrencePage, RawOccurrence};
use crate::paginator::Paginator;
use biodash_common::{BiodashError, Result};
use reqwest::{header, Client};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// Client for paginated occurrence searches
#[derive(Clone)]
pub struct OccurrenceClient {
    client: Client,
    config: FetchConfig,
}

impl OccurrenceClient {
    /// Create a new client
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(transport)?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(FetchConfig::from_env())
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetch every page of `base_url`.
    ///
    /// `on_progress` receives a status line before and after each request.
    /// Fails with [`BiodashError::Network`] on a non-success status,
    /// [`BiodashError::CapExceeded`] past the page cap and
    /// [`BiodashError::Cancelled`] when `cancel` fires.
    #[instrument(skip(self, on_progress, cancel))]
    pub async fn fetch_all<F>(
        &self,
        base_url: &str,
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<Vec<RawOccurrence>>
    where
        F: FnMut(&str),
    {
        let mut paginator = Paginator::new(base_url, &self.config)?;

        while let Some(url) = paginator.next_request() {
            if cancel.is_cancelled() {
                paginator.cancel();
                return Err(BiodashError::Cancelled);
            }

            on_progress(&paginator.fetching_message());
            debug!(url = %url, "Requesting page");

            let page = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    paginator.cancel();
                    info!(pages = paginator.pages_fetched(), "Fetch cancelled");
                    return Err(BiodashError::Cancelled);
                }
                page = self.get_json(url.as_str()) => page,
            };

            let page = match page {
                Ok(value) => OccurrencePage::from_value(value),
                Err(e) => {
                    paginator.fail();
                    warn!(error = %e, "Page request failed");
                    return Err(e);
                },
            };

            paginator.apply_page(page).inspect_err(|e| {
                warn!(error = %e, "Stopping fetch");
            })?;
            on_progress(&paginator.fetched_message());
        }

        let occurrences = paginator.into_occurrences();
        on_progress(&format!("Done. {} records.", occurrences.len()));
        info!(records = occurrences.len(), "Fetch complete");

        Ok(occurrences)
    }

    /// GET a JSON document.
    pub async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BiodashError::Network {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<Value>().await.map_err(transport)
    }
}

fn transport(err: reqwest::Error) -> BiodashError {
    BiodashError::Transport(err.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OccurrenceClient::new(FetchConfig::default()).unwrap();
        assert_eq!(client.config().max_pages, 400);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_any_request() {
        let client = OccurrenceClient::new(FetchConfig::default()).unwrap();
        let mut messages = Vec::new();
        let err = client
            .fetch_all("::nonsense::", |m| messages.push(m.to_string()), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BiodashError::InvalidUrl(_)));
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn test_pre_cancelled_token() {
        let client = OccurrenceClient::new(FetchConfig::default()).unwrap();
        let token = CancellationToken::new();
        token.cancel();
        let err = client
            .fetch_all("http://127.0.0.1:9/occurrences", |_| {}, &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }
}
