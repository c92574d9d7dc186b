//! Terminal and JSON rendering
//!
//! Renderers build the whole output as a `String` so commands print it in one
//! go and tests can inspect it. Headings follow the `Title:` style used across
//! the CLI; every table uses the rounded UTF-8 preset.

use crate::progress::truncate;
use crate::session::Session;
use biodash_analysis::license_info;
use biodash_analysis::taxonomy::StatusTaxonomy;
use biodash_analysis::{CountRow, Drill, Report, NOT_LOADED};
use biodash_common::Record;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};
use serde::Serialize;

/// How results are printed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tables and headings
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

const NAME_WIDTH: usize = 40;

/// Where a report came from
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportContext<'a> {
    pub source_url: Option<&'a str>,
    pub fetched_at: Option<DateTime<Utc>>,
    pub taxonomy_error: Option<&'a str>,
}

impl<'a> ReportContext<'a> {
    pub fn from_session(session: &'a Session) -> Self {
        Self {
            source_url: session.source_url(),
            fetched_at: session.fetched_at(),
            taxonomy_error: session.taxonomy_error(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReportJson<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fetched_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    taxonomy_error: Option<&'a str>,
    #[serde(flatten)]
    report: &'a Report,
}

#[derive(Serialize)]
struct DrillJson<'a> {
    drill: String,
    count: usize,
    records: &'a [&'a Record],
}

// ============================================================================
// Document builder
// ============================================================================

#[derive(Default)]
struct Doc(String);

impl Doc {
    fn line(&mut self, text: impl AsRef<str>) {
        self.0.push_str(text.as_ref());
        self.0.push('\n');
    }

    fn blank(&mut self) {
        self.0.push('\n');
    }

    fn heading(&mut self, title: &str) {
        self.blank();
        self.line(format!("{}", title.cyan().bold()));
    }

    fn table(&mut self, table: Table) {
        self.line(table.to_string());
    }

    fn finish(self) -> String {
        self.0
    }
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(header);
    table
}

fn count_section(doc: &mut Doc, title: &str, label: &str, value: &str, rows: &[CountRow], empty: &str) {
    doc.heading(title);
    if rows.is_empty() {
        doc.line(format!("  {}", empty));
        return;
    }
    let mut t = table(vec![label, value]);
    for row in rows {
        t.add_row(vec![truncate(&row.label, NAME_WIDTH), row.count.to_string()]);
    }
    doc.table(t);
}

// ============================================================================
// Report
// ============================================================================

/// Render every view of `report` as terminal tables.
pub fn render_report(report: &Report, context: &ReportContext<'_>) -> String {
    let mut doc = Doc::default();

    doc.line(format!("{}", "Summary:".cyan().bold()));
    if let Some(url) = context.source_url {
        doc.line(format!("  Source:  {}", url));
    }
    if let Some(at) = context.fetched_at {
        doc.line(format!("  Fetched: {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
    }
    doc.line(format!("  Records: {}", report.total_records.to_string().bold()));

    if report.is_empty() {
        doc.blank();
        doc.line("No records returned.");
        return doc.finish();
    }

    let views = &report.aggregates;
    count_section(&mut doc, "Records by month:", "Month", "Records", &views.by_month, "No dated records.");

    doc.heading("Top species:");
    let mut t = table(vec!["Species", "Records", "Status"]);
    for species in &views.top_species {
        t.add_row(vec![
            truncate(&species.display, NAME_WIDTH),
            species.count.to_string(),
            species.status.clone().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    doc.table(t);

    count_section(&mut doc, "Records by class:", "Class", "Records", &views.by_class, "No records.");
    count_section(&mut doc, "Basis of record:", "Basis", "Records", &views.by_basis, "No records.");
    count_section(&mut doc, "Top providers:", "Provider", "Records", &views.top_providers, "No records.");
    count_section(
        &mut doc,
        "Species richness by month:",
        "Month",
        "Species",
        &views.richness_by_month,
        "No dated records.",
    );

    let matrix = &views.class_by_month;
    if !matrix.is_empty() {
        doc.heading("Class by month:");
        let mut header = vec!["Month"];
        header.extend(matrix.classes.iter().map(String::as_str));
        let mut t = table(header);
        for (month, counts) in matrix.months.iter().zip(&matrix.counts) {
            let mut row = vec![month.clone()];
            row.extend(counts.iter().map(usize::to_string));
            t.add_row(row);
        }
        doc.table(t);
    }

    render_status(&mut doc, report, context.taxonomy_error);
    render_map(&mut doc, report);
    render_provenance(&mut doc, report);

    doc.finish()
}

fn render_status(doc: &mut Doc, report: &Report, taxonomy_error: Option<&str>) {
    doc.heading("Conservation status:");

    let Some(status) = &report.status else {
        doc.line(format!("  {}", NOT_LOADED.yellow()));
        if let Some(err) = taxonomy_error {
            doc.line(format!("  {}", err.dimmed()));
        }
        return;
    };

    for list in &status.lists {
        doc.blank();
        doc.line(format!(
            "  {} {} species, {} records",
            format!("{}:", list.list).bold(),
            list.distinct_total,
            list.occurrence_total
        ));
        if list.species.is_empty() {
            doc.line("  No matches.");
            continue;
        }
        let mut t = table(vec!["Species", "Scientific", "Annotation", "Records"]);
        for species in &list.species {
            t.add_row(vec![
                truncate(&species.name, NAME_WIDTH),
                truncate(&species.scientific, NAME_WIDTH),
                species.annotation.clone(),
                species.occurrence_count.to_string(),
            ]);
        }
        doc.table(t);
    }

    if !status.classes.is_empty() {
        doc.heading("Status species by class:");
        let mut header = vec!["List"];
        header.extend(status.classes.iter().map(String::as_str));
        header.push("Total");
        let mut t = table(header);
        for list in &status.lists {
            let mut row = vec![list.list.clone()];
            row.extend(status.classes.iter().map(|c| list.distinct_in(c).to_string()));
            row.push(list.distinct_total.to_string());
            t.add_row(row);
        }
        doc.table(t);
    }

    if let Some(breakdown) = &report.status_breakdown {
        count_section(doc, "Records by status:", "Status", "Records", breakdown, "No records.");
    }
}

fn render_map(doc: &mut Doc, report: &Report) {
    doc.heading("Map:");
    let map = &report.map;
    let limit_note = if map.truncated { " (limit reached)" } else { "" };
    doc.line(format!("  {} located records{}", map.points.len(), limit_note));
    if let Some(b) = map.bounds {
        doc.line(format!(
            "  Bounds: lat {:.4} to {:.4}, lon {:.4} to {:.4}",
            b.min_lat, b.max_lat, b.min_lon, b.max_lon
        ));
    }
}

fn render_provenance(doc: &mut Doc, report: &Report) {
    doc.heading("Data providers:");
    let mut t = table(vec!["Provider", "Records", "Datasets"]);
    for group in &report.provider_groups {
        let datasets = group
            .datasets
            .iter()
            .map(|d| format!("{} ({})", truncate(&d.dataset, NAME_WIDTH), d.license.label))
            .collect::<Vec<_>>()
            .join("\n");
        t.add_row(vec![group.provider.clone(), group.record_count.to_string(), datasets]);
    }
    doc.table(t);

    doc.heading("Datasets:");
    let mut t = table(vec!["Dataset", "Licence", "Providers", "Records"]);
    for row in &report.dataset_summary {
        t.add_row(vec![
            truncate(&row.dataset, NAME_WIDTH),
            row.license.label.clone(),
            row.providers.to_string(),
            row.records.to_string(),
        ]);
    }
    doc.table(t);

    doc.heading("Attribution:");
    for line in &report.attribution {
        doc.line(format!("  • {}", line.credit));
    }
}

/// Serialize `report` with its source metadata.
pub fn report_json(report: &Report, context: &ReportContext<'_>) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&ReportJson {
        source: context.source_url,
        fetched_at: context.fetched_at.map(|at| at.to_rfc3339()),
        taxonomy_error: context.taxonomy_error,
        report,
    })
}

// ============================================================================
// Drill-down
// ============================================================================

/// Render the records behind one view row.
pub fn render_drill(drill: &Drill, records: &[&Record]) -> String {
    let mut doc = Doc::default();
    doc.line(format!("{}", format!("{}:", drill.title()).cyan().bold()));

    if records.is_empty() {
        doc.line("  No matching records.");
        return doc.finish();
    }

    let mut t = table(vec!["Species", "Scientific", "Date", "Provider", "Dataset", "Licence", "Record"]);
    for record in records {
        t.add_row(vec![
            truncate(&record.species_display, NAME_WIDTH),
            truncate(&record.scientific_name, NAME_WIDTH),
            record.date_label().to_string(),
            truncate(record.provider_label(), NAME_WIDTH),
            truncate(&record.data_resource_name, NAME_WIDTH),
            license_info(&record.license).label,
            record.record_url().unwrap_or_else(|| "-".to_string()),
        ]);
    }
    doc.table(t);
    doc.line(format!("{} records", records.len()));
    doc.finish()
}

pub fn drill_json(drill: &Drill, records: &[&Record]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&DrillJson {
        drill: drill.title(),
        count: records.len(),
        records,
    })
}

// ============================================================================
// Taxonomy reference
// ============================================================================

/// Render the status lists as one reference table.
pub fn render_reference(taxonomy: &StatusTaxonomy) -> String {
    let mut doc = Doc::default();
    doc.line(format!("{}", "Conservation status lists:".cyan().bold()));

    let mut t = table(vec!["List", "Species", "Annotation"]);
    for row in taxonomy.reference_rows() {
        t.add_row(vec![row.list, row.species, row.annotation]);
    }
    doc.table(t);
    doc.line(format!(
        "{} species in {} lists",
        taxonomy.species_count(),
        taxonomy.lists().len()
    ));
    doc.finish()
}

/// The placeholder shown wherever status data would be.
pub fn render_not_loaded(error: Option<&str>) -> String {
    let mut doc = Doc::default();
    doc.line(format!("{}", NOT_LOADED.yellow()));
    if let Some(err) = error {
        doc.line(format!("{}", err.dimmed()));
    }
    doc.finish()
}
