//! Fetch command implementation
//!
//! Runs one paginated fetch, then prints the dashboard report or the records
//! behind a single drill-down.

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{self, OutputFormat, ReportContext};
use crate::progress::create_spinner;
use crate::session::{FetchOutcome, Session};
use biodash_analysis::{Drill, ReportOptions};
use biodash_common::BiodashError;
use biodash_ingest::OccurrenceClient;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Options of `biodash fetch`
#[derive(Debug, Clone, Default)]
pub struct FetchArgs {
    pub url: Option<String>,
    pub taxonomy: Option<PathBuf>,
    pub format: OutputFormat,
    pub drill: Option<String>,
    pub max_points: Option<usize>,
}

/// Run the fetch command
pub async fn run(args: FetchArgs) -> Result<()> {
    let config = Config::from_env();

    let url = args
        .url
        .or_else(|| config.api_url.clone())
        .ok_or(CliError::MissingUrl)?;

    // Reject a bad drill before spending a fetch on it
    let drill = args.drill.as_deref().map(parse_drill).transpose()?;

    let mut session = Session::new();
    let taxonomy_path = args.taxonomy.unwrap_or_else(|| config.taxonomy_path.clone());
    session.load_taxonomy(&taxonomy_path);

    let client = OccurrenceClient::from_env()?;
    let ticket = session.begin_fetch();

    let ctrl_c = ticket.token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c.cancel();
        }
    });

    debug!(url = %url, generation = ticket.generation(), "Starting fetch");
    let spinner = create_spinner("Fetching…");
    let result = client
        .fetch_all(&url, |status| spinner.set_message(status.to_string()), ticket.token())
        .await;
    spinner.finish_and_clear();

    match session.complete_fetch(ticket, &url, result)? {
        FetchOutcome::Loaded(count) => info!(records = count, "Fetch complete"),
        FetchOutcome::Cancelled => {
            eprintln!("Cancelled.");
            return Ok(());
        },
        FetchOutcome::Stale => return Ok(()),
    }

    if let Some(drill) = drill {
        if drill.needs_taxonomy() && session.taxonomy().is_none() {
            warn!(drill = %drill, "Status drill-down without a taxonomy selects nothing");
        }
        let records = session.drill(&drill);
        match args.format {
            OutputFormat::Table => print!("{}", output::render_drill(&drill, &records)),
            OutputFormat::Json => println!("{}", output::drill_json(&drill, &records)?),
        }
        return Ok(());
    }

    let report = session.report(ReportOptions {
        max_map_points: config.map_points_limit(args.max_points),
    });
    let context = ReportContext::from_session(&session);
    match args.format {
        OutputFormat::Table => print!("{}", output::render_report(&report, &context)),
        OutputFormat::Json => println!("{}", output::report_json(&report, &context)?),
    }

    Ok(())
}

fn parse_drill(raw: &str) -> Result<Drill> {
    raw.parse().map_err(|e| match e {
        BiodashError::Config(msg) => CliError::InvalidDrill(msg),
        other => CliError::InvalidDrill(other.to_string()),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drill() {
        assert_eq!(parse_drill("month=2024-05").unwrap(), Drill::Month("2024-05".to_string()));

        let err = parse_drill("colour=red").unwrap_err();
        assert!(matches!(err, CliError::InvalidDrill(_)));
        assert!(err.to_string().starts_with("Invalid drill-down: Unknown drill 'colour'"));
    }
}
