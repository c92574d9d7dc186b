//! Projection of raw API occurrences onto flat [`Record`]s
//!
//! Mapping never fails: missing or malformed fields become empty strings, and
//! coordinates that are absent or non-numeric become `NaN`.

use crate::models::{number, text, RawOccurrence};
use biodash_common::names::normalize;
use biodash_common::{Record, UNKNOWN};
use chrono::DateTime;
use serde_json::Value;

/// Map every occurrence, preserving order.
pub fn map_all(raw: &[RawOccurrence]) -> Vec<Record> {
    raw.iter().map(map_occurrence).collect()
}

/// Map a single occurrence.
pub fn map_occurrence(o: &RawOccurrence) -> Record {
    let scientific = text(o.scientific_name.as_ref()).trim().to_string();
    let vernacular = text(o.vernacular_name.as_ref()).trim().to_string();

    let species_key = if scientific.is_empty() {
        normalize(if vernacular.is_empty() { UNKNOWN } else { &vernacular })
    } else {
        normalize(&scientific)
    };

    let species_display = [&vernacular, &scientific]
        .into_iter()
        .find(|name| !name.is_empty())
        .cloned()
        .unwrap_or_else(|| UNKNOWN.to_string());

    Record {
        uuid: text(o.uuid.as_ref()),
        occurrence_id: text(o.occurrence_id.as_ref()),
        scientific_name: scientific,
        vernacular_name: vernacular,
        class_name: text(o.classs.as_ref()).trim().to_string(),
        basis_of_record: text(o.basis_of_record.as_ref()).trim().to_string(),
        species_key,
        species_display,
        provider: text(o.data_provider_name.as_ref()).trim().to_string(),
        data_resource_name: text(o.data_resource_name.as_ref()).trim().to_string(),
        license: text(o.license.as_ref()).trim().to_uppercase(),
        event_date_str: epoch_millis_to_string(o.event_date.as_ref()),
        occurrence_year_str: epoch_millis_to_string(o.occurrence_year.as_ref()),
        lat: number(o.decimal_latitude.as_ref()).unwrap_or(f64::NAN),
        lon: number(o.decimal_longitude.as_ref()).unwrap_or(f64::NAN),
    }
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM:SS` in UTC.
///
/// Anything that is not a finite positive number, or lies outside the
/// representable date range, yields an empty string.
pub fn epoch_millis_to_string(value: Option<&Value>) -> String {
    let Some(ms) = number(value).filter(|ms| *ms > 0.0) else {
        return String::new();
    };

    match DateTime::from_timestamp_millis(ms.trunc() as i64) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => String::new(),
    }
}
