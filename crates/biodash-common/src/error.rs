//! Error types for Biodash

use thiserror::Error;

/// Result type alias for Biodash operations
pub type Result<T> = std::result::Result<T, BiodashError>;

/// Main error type for Biodash
#[derive(Error, Debug)]
pub enum BiodashError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The records API answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Network { status: u16, url: String },

    /// The request never produced a usable response (connect, timeout, body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Pagination ran past the page safety cap
    #[error("Safety cap reached ({max_pages} pages)")]
    CapExceeded { max_pages: usize },

    #[error("Fetch cancelled")]
    Cancelled,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The status taxonomy document is unusable
    #[error("Taxonomy error: {0}")]
    Taxonomy(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BiodashError {
    /// Create a taxonomy error
    pub fn taxonomy(msg: impl Into<String>) -> Self {
        Self::Taxonomy(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Cancellation is reported as a neutral outcome, not a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BiodashError::Network {
            status: 404,
            url: "https://example.org/occurrences".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://example.org/occurrences");

        let err = BiodashError::CapExceeded { max_pages: 400 };
        assert_eq!(err.to_string(), "Safety cap reached (400 pages)");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(BiodashError::Cancelled.is_cancelled());
        assert!(!BiodashError::taxonomy("bad").is_cancelled());
    }
}
