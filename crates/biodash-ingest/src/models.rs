//! Wire models for the occurrence search API
//!
//! The API is not strict about types: numbers arrive as strings, fields go
//! missing, `occurrences` is sometimes absent. Everything is therefore held
//! as raw JSON and interpreted leniently by the accessors below.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One occurrence exactly as the API returned it. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOccurrence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<Value>,
    #[serde(rename = "occurrenceID", skip_serializing_if = "Option::is_none")]
    pub occurrence_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vernacular_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_of_record: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_provider_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_resource_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license: Option<Value>,
    /// Epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_date: Option<Value>,
    /// Epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrence_year: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_latitude: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decimal_longitude: Option<Value>,
}

/// One page of `GET <baseUrl>?...&startIndex=n`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OccurrencePage {
    pub occurrences: Option<Value>,
    pub total_records: Option<Value>,
    pub page_size: Option<Value>,
}

impl OccurrencePage {
    /// Interpret any JSON body as a page; a non-object body is an empty page.
    pub fn from_value(value: Value) -> Self {
        // serde would otherwise fill the fields from an array by position
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }

    /// The occurrences array; entries that are not objects become empty
    /// occurrences rather than being dropped.
    pub fn into_occurrences(self) -> Vec<RawOccurrence> {
        match self.occurrences {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).unwrap_or_default())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// `totalRecords` when it is a finite number (fractions round up).
    pub fn total_records(&self) -> Option<usize> {
        let total = number(self.total_records.as_ref())?;
        Some(total.max(0.0).ceil() as usize)
    }

    /// `pageSize` when it is a finite number of at least one.
    pub fn page_size(&self) -> Option<usize> {
        let size = number(self.page_size.as_ref())?.floor();
        (size >= 1.0).then_some(size as usize)
    }
}

/// Read a JSON value as text: strings as-is, numbers and booleans printed,
/// anything else empty.
pub fn text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Read a JSON value as a finite number. Numeric strings are accepted.
pub fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
