//! Error types for the Biodash CLI
//!
//! Messages are user-facing and say what to try next.

use biodash_common::BiodashError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    /// No URL on the command line or in BIODASH_API_URL
    #[error("No records URL given. Pass one as an argument or set BIODASH_API_URL.")]
    MissingUrl,

    /// The records API could not be read
    #[error("Fetch failed: {0}. Check the URL and your connection, then run the fetch again.")]
    Fetch(BiodashError),

    /// The records URL could not be parsed
    #[error("{0}. The URL must be absolute, e.g. 'https://records-ws.nbnatlas.org/occurrences/search?q=*:*'.")]
    InvalidUrl(BiodashError),

    /// `--drill` is malformed
    #[error("Invalid drill-down: {0}")]
    InvalidDrill(String),

    /// The taxonomy file is required here but unusable
    #[error("{0}. Check the file at BIODASH_TAXONOMY or pass --taxonomy.")]
    Taxonomy(BiodashError),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables or .env file.")]
    Config(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// JSON output failed
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<BiodashError> for CliError {
    fn from(err: BiodashError) -> Self {
        match err {
            BiodashError::InvalidUrl(_) => Self::InvalidUrl(err),
            BiodashError::Taxonomy(_) => Self::Taxonomy(err),
            BiodashError::Config(msg) => Self::Config(msg),
            BiodashError::Io(e) => Self::Io(e),
            BiodashError::Serialization(e) => Self::Json(e),
            other => Self::Fetch(other),
        }
    }
}
