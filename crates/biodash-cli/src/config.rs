//! CLI configuration
//!
//! Values come from the environment (and a `.env` file when present).
//! Command-line flags override them.

use biodash_analysis::clamp_max_points;
use std::path::PathBuf;
use tracing::warn;

/// Taxonomy file used when neither `--taxonomy` nor `BIODASH_TAXONOMY` is set
pub const DEFAULT_TAXONOMY_PATH: &str = "./bocc.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Occurrence search URL used when `fetch` is given none
    pub api_url: Option<String>,
    pub taxonomy_path: PathBuf,
    /// Already clamped
    pub max_map_points: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            taxonomy_path: PathBuf::from(DEFAULT_TAXONOMY_PATH),
            max_map_points: clamp_max_points(None),
        }
    }
}

impl Config {
    /// Load from environment variables
    pub fn from_env() -> Self {
        // Load .env file if present
        dotenvy::dotenv().ok();
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from a variable lookup. Blank values count as unset.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let max_map_points = match get("BIODASH_MAX_MAP_POINTS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) => clamp_max_points(Some(n)),
                Err(_) => {
                    warn!(value = %raw, "Ignoring invalid BIODASH_MAX_MAP_POINTS");
                    defaults.max_map_points
                },
            },
            None => defaults.max_map_points,
        };

        Self {
            api_url: get("BIODASH_API_URL"),
            taxonomy_path: get("BIODASH_TAXONOMY")
                .map(PathBuf::from)
                .unwrap_or(defaults.taxonomy_path),
            max_map_points,
        }
    }

    /// The point limit for a run, preferring the flag.
    pub fn map_points_limit(&self, flag: Option<usize>) -> usize {
        match flag {
            Some(n) => clamp_max_points(Some(n)),
            None => self.max_map_points,
        }
    }
}
