//! Taxonomy command implementation
//!
//! Prints the conservation-status reference table. A taxonomy that cannot be
//! loaded is reported with the placeholder and is not an error.

use crate::config::Config;
use crate::error::Result;
use crate::output;
use biodash_analysis::StatusTaxonomy;
use std::path::PathBuf;

/// Run the taxonomy command
pub async fn run(path: Option<PathBuf>) -> Result<()> {
    let path = path.unwrap_or_else(|| Config::from_env().taxonomy_path);

    match StatusTaxonomy::load(&path) {
        Ok(taxonomy) => print!("{}", output::render_reference(&taxonomy)),
        Err(e) => print!("{}", output::render_not_loaded(Some(&e.to_string()))),
    }

    Ok(())
}
