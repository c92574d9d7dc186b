//! The complete dashboard for one record set

use crate::aggregate::{aggregate, Aggregates, CountRow};
use crate::attribution::{attribution, dataset_summary, provider_groups, Attribution, DatasetSummary, ProviderGroup};
use crate::cross_reference::{annotate_species_status, status_breakdown, CrossReference};
use crate::map_points::{map_points, MapPoints, DEFAULT_MAX_POINTS};
use crate::taxonomy::StatusTaxonomy;
use biodash_common::Record;
use serde::Serialize;
use tracing::{debug, instrument};

/// Knobs for [`Report::build`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub max_map_points: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_map_points: DEFAULT_MAX_POINTS,
        }
    }
}

/// Every view of one record set, ready to render or serialize
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub total_records: usize,
    #[serde(flatten)]
    pub aggregates: Aggregates,
    /// `None` when no taxonomy is loaded
    pub status: Option<CrossReference>,
    pub status_breakdown: Option<Vec<CountRow>>,
    pub attribution: Vec<Attribution>,
    pub provider_groups: Vec<ProviderGroup>,
    pub dataset_summary: Vec<DatasetSummary>,
    pub map: MapPoints,
}

impl Report {
    #[instrument(skip_all, fields(records = records.len(), taxonomy = taxonomy.is_some()))]
    pub fn build(records: &[Record], taxonomy: Option<&StatusTaxonomy>, options: ReportOptions) -> Self {
        let mut aggregates = aggregate(records);
        if let Some(t) = taxonomy {
            annotate_species_status(&mut aggregates.top_species, records, t);
        }

        let report = Self {
            total_records: records.len(),
            aggregates,
            status: taxonomy.map(|t| CrossReference::build(records, t)),
            status_breakdown: taxonomy.map(|t| status_breakdown(records, t)),
            attribution: attribution(records),
            provider_groups: provider_groups(records),
            dataset_summary: dataset_summary(records),
            map: map_points(records, taxonomy, options.max_map_points),
        };

        debug!(
            months = report.aggregates.by_month.len(),
            map_points = report.map.points.len(),
            "Built report"
        );
        report
    }

    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::cross_reference::OTHER;

    fn records() -> Vec<Record> {
        vec![
            Record {
                uuid: "1".to_string(),
                scientific_name: "Numenius arquata".to_string(),
                vernacular_name: "Curlew".to_string(),
                species_key: "numenius arquata".to_string(),
                species_display: "Curlew".to_string(),
                class_name: "Aves".to_string(),
                provider: "BTO".to_string(),
                data_resource_name: "BirdTrack".to_string(),
                license: "CC-BY".to_string(),
                event_date_str: "2024-05-01 06:00:00".to_string(),
                lat: 54.6,
                lon: -2.1,
                ..Default::default()
            },
            Record {
                uuid: "2".to_string(),
                vernacular_name: "Fox".to_string(),
                species_key: "fox".to_string(),
                species_display: "Fox".to_string(),
                class_name: "Mammalia".to_string(),
                lat: f64::NAN,
                lon: f64::NAN,
                ..Default::default()
            },
        ]
    }

    fn taxonomy() -> StatusTaxonomy {
        StatusTaxonomy::from_json(
            r#"{ "lists": [ { "list": "Red", "species": [ { "name": "Curlew", "scientific": "Numenius arquata" } ] } ] }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_report_with_taxonomy() {
        let t = taxonomy();
        let report = Report::build(&records(), Some(&t), ReportOptions::default());

        assert_eq!(report.total_records, 2);
        assert_eq!(report.aggregates.by_month.len(), 1);
        assert_eq!(report.map.points.len(), 1);
        assert_eq!(report.map.points[0].status.as_deref(), Some("Red"));

        let curlew = report
            .aggregates
            .top_species
            .iter()
            .find(|s| s.display == "Curlew")
            .unwrap();
        assert_eq!(curlew.status.as_deref(), Some("Red"));

        let status = report.status.as_ref().unwrap();
        assert_eq!(status.list("Red").unwrap().occurrence_total, 1);
        let breakdown = report.status_breakdown.as_ref().unwrap();
        assert_eq!(breakdown.last().unwrap(), &CountRow::new(OTHER, 1));

        assert_eq!(report.attribution.len(), 2);
        assert_eq!(report.provider_groups.len(), 2);
    }

    #[test]
    fn test_report_without_taxonomy() {
        let report = Report::build(&records(), None, ReportOptions::default());
        assert!(report.status.is_none());
        assert!(report.status_breakdown.is_none());
        assert!(report.aggregates.top_species.iter().all(|s| s.status.is_none()));
    }

    #[test]
    fn test_report_serializes() {
        let report = Report::build(&records(), None, ReportOptions::default());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["totalRecords"], 2);
        assert!(json["byMonth"].is_array());
        assert!(json["classByMonth"]["classes"].is_array());
        assert!(json["status"].is_null());
    }

    #[test]
    fn test_empty_report() {
        let report = Report::build(&[], Some(&taxonomy()), ReportOptions::default());
        assert!(report.is_empty());
        assert!(report.map.bounds.is_none());
        assert_eq!(report.status_breakdown.unwrap(), vec![CountRow::new("Red", 0), CountRow::new(OTHER, 0)]);
    }
}
