//! Common types used across Biodash

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder for a missing name, class, basis or provider.
pub const UNKNOWN: &str = "(unknown)";

/// Base URL of the public record pages.
pub const RECORD_PAGE_BASE: &str = "https://records.nbnatlas.org/occurrences/";

// ============================================================================
// Record
// ============================================================================

/// One biological occurrence, flattened from the API payload.
///
/// Records are built once by the ingest mapper and never mutated. Text fields
/// are already trimmed; absent values are empty strings and absent or
/// non-numeric coordinates are `NaN`.
///
/// Serialized field names follow the records API (`classs` keeps its
/// trailing "s").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Opaque record id, may be empty
    pub uuid: String,
    #[serde(rename = "occurrenceID")]
    pub occurrence_id: String,

    pub scientific_name: String,
    pub vernacular_name: String,
    /// Taxonomic class
    #[serde(rename = "classs")]
    pub class_name: String,
    pub basis_of_record: String,

    /// Normalized scientific name, else normalized vernacular name, else the
    /// normalized unknown placeholder
    pub species_key: String,
    /// Vernacular name, else scientific name, else [`UNKNOWN`]
    pub species_display: String,

    /// Data provider organisation
    pub provider: String,
    pub data_resource_name: String,
    /// Upper-cased license code or empty
    pub license: String,

    /// `YYYY-MM-DD HH:MM:SS` (UTC) or empty
    pub event_date_str: String,
    /// `YYYY-MM-DD HH:MM:SS` (UTC) or empty
    pub occurrence_year_str: String,

    #[serde(deserialize_with = "nan_from_null")]
    pub lat: f64,
    #[serde(deserialize_with = "nan_from_null")]
    pub lon: f64,
}

impl Record {
    /// Names to try when matching this record against another dataset, in
    /// priority order: scientific first, then vernacular. Blank names are
    /// skipped.
    ///
    /// Every component that joins on names uses this order.
    pub fn name_candidates(&self) -> impl Iterator<Item = &str> {
        [self.scientific_name.as_str(), self.vernacular_name.as_str()]
            .into_iter()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// True when the record carries at least one non-blank name.
    pub fn is_named(&self) -> bool {
        self.name_candidates().next().is_some()
    }

    /// The event date if present, else the occurrence year date.
    pub fn date_label(&self) -> &str {
        if self.event_date_str.is_empty() {
            &self.occurrence_year_str
        } else {
            &self.event_date_str
        }
    }

    /// Year-month bucket (`YYYY-MM`) used by every monthly view.
    ///
    /// Only the first ten characters of [`Record::date_label`] are read, as an
    /// ISO date. Records without a parseable date have no month.
    pub fn event_month(&self) -> Option<String> {
        let date = parse_iso_date(self.date_label().trim())?;
        Some(date.format("%Y-%m").to_string())
    }

    /// Trimmed class, or [`UNKNOWN`]
    pub fn class_label(&self) -> &str {
        label_or_unknown(&self.class_name)
    }

    /// Trimmed basis of record, or [`UNKNOWN`]
    pub fn basis_label(&self) -> &str {
        label_or_unknown(&self.basis_of_record)
    }

    /// Trimmed provider, or [`UNKNOWN`]
    pub fn provider_label(&self) -> &str {
        label_or_unknown(&self.provider)
    }

    /// Public page for this record, when it has a uuid.
    pub fn record_url(&self) -> Option<String> {
        let uuid = self.uuid.trim();
        (!uuid.is_empty()).then(|| format!("{}{}", RECORD_PAGE_BASE, uuid))
    }

    /// Latitude/longitude when both are finite and on the globe.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let (lat, lon) = (self.lat, self.lon);
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return None;
        }
        Some((lat, lon))
    }
}

fn label_or_unknown(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        UNKNOWN
    } else {
        trimmed
    }
}

/// Parse the leading `YYYY-MM-DD` of a string.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    let head = s.get(..10)?;
    let bytes = head.as_bytes();
    let shape_ok = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !shape_ok {
        return None;
    }

    let year = head[0..4].parse().ok()?;
    let month = head[5..7].parse().ok()?;
    let day = head[8..10].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// serde_json writes non-finite floats as `null`; read them back as `NaN`.
fn nan_from_null<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
