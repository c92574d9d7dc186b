//! Drill-down filters
//!
//! Each aggregate view can be opened to the records behind one of its rows.
//! A [`Drill`] names the row; [`Drill::apply`] selects the records.

use crate::taxonomy::StatusTaxonomy;
use biodash_common::names::same_species;
use biodash_common::{BiodashError, Record, Result};
use std::fmt;
use std::str::FromStr;

/// The records behind one row or cell of a view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drill {
    /// `YYYY-MM`
    Month(String),
    /// Any name of the record normalizes like this one
    Species(String),
    Class(String),
    Basis(String),
    Provider(String),
    MonthClass { month: String, class: String },
    /// Records attributed to the taxonomy entry with this name
    StatusSpecies(String),
    /// Records attributed to a list, optionally within one class
    StatusList { list: String, class: Option<String> },
}

impl Drill {
    /// Heading for the drill-down table
    pub fn title(&self) -> String {
        match self {
            Drill::Month(month) => format!("Records in {}", month),
            Drill::Species(name) => format!("Records for {}", name),
            Drill::Class(class) => format!("Records in class: {}", class),
            Drill::Basis(basis) => format!("Records with basis: {}", basis),
            Drill::Provider(provider) => format!("Records from provider: {}", provider),
            Drill::MonthClass { month, class } => format!("Records in {} / {}", month, class),
            Drill::StatusSpecies(name) => format!("Records for status species {}", name),
            Drill::StatusList { list, class: None } => format!("Records on the {} list", list),
            Drill::StatusList {
                list,
                class: Some(class),
            } => format!("Records on the {} list / {}", list, class),
        }
    }

    /// True when this drill needs a loaded taxonomy to select anything.
    pub fn needs_taxonomy(&self) -> bool {
        matches!(self, Drill::StatusSpecies(_) | Drill::StatusList { .. })
    }

    /// Matching records, in record order.
    ///
    /// Status drills select nothing without a taxonomy.
    pub fn apply<'a>(&self, records: &'a [Record], taxonomy: Option<&StatusTaxonomy>) -> Vec<&'a Record> {
        match self {
            Drill::Month(month) => by_month(records, month),
            Drill::Species(name) => by_species(records, name),
            Drill::Class(class) => by_label(records, class, Record::class_label),
            Drill::Basis(basis) => by_label(records, basis, Record::basis_label),
            Drill::Provider(provider) => by_label(records, provider, Record::provider_label),
            Drill::MonthClass { month, class } => by_month(records, month)
                .into_iter()
                .filter(|r| same_label(r.class_label(), class))
                .collect(),
            Drill::StatusSpecies(name) => match taxonomy {
                Some(t) => by_status_species(records, t, name),
                None => Vec::new(),
            },
            Drill::StatusList { list, class } => match taxonomy {
                Some(t) => by_status_list(records, t, list, class.as_deref()),
                None => Vec::new(),
            },
        }
    }
}

impl fmt::Display for Drill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title())
    }
}

impl FromStr for Drill {
    type Err = BiodashError;

    /// `KIND=VALUE`; `month-class` and `list` take `A/B` values.
    fn from_str(s: &str) -> Result<Self> {
        let (kind, value) = s
            .split_once('=')
            .ok_or_else(|| BiodashError::config(format!("Expected KIND=VALUE, got '{}'", s)))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(BiodashError::config(format!("Empty value for drill '{}'", kind.trim())));
        }

        let pair = |what: &str| -> Result<(String, String)> {
            match value.split_once('/') {
                Some((a, b)) if !a.trim().is_empty() && !b.trim().is_empty() => {
                    Ok((a.trim().to_string(), b.trim().to_string()))
                },
                _ => Err(BiodashError::config(format!(
                    "Expected {} for drill '{}', got '{}'",
                    what,
                    kind.trim(),
                    value
                ))),
            }
        };

        match kind.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(Drill::Month(value.to_string())),
            "species" => Ok(Drill::Species(value.to_string())),
            "class" => Ok(Drill::Class(value.to_string())),
            "basis" => Ok(Drill::Basis(value.to_string())),
            "provider" => Ok(Drill::Provider(value.to_string())),
            "month-class" => {
                let (month, class) = pair("MONTH/CLASS")?;
                Ok(Drill::MonthClass { month, class })
            },
            "status" => Ok(Drill::StatusSpecies(value.to_string())),
            "list" => match value.split_once('/') {
                Some(_) => {
                    let (list, class) = pair("LIST/CLASS")?;
                    Ok(Drill::StatusList {
                        list,
                        class: Some(class),
                    })
                },
                None => Ok(Drill::StatusList {
                    list: value.to_string(),
                    class: None,
                }),
            },
            other => Err(BiodashError::config(format!(
                "Unknown drill '{}' (expected month, species, class, basis, provider, month-class, status or list)",
                other
            ))),
        }
    }
}

fn same_label(label: &str, wanted: &str) -> bool {
    label.to_lowercase() == wanted.trim().to_lowercase()
}

fn by_month<'a>(records: &'a [Record], month: &str) -> Vec<&'a Record> {
    let month = month.trim();
    records
        .iter()
        .filter(|r| r.event_month().as_deref() == Some(month))
        .collect()
}

fn by_species<'a>(records: &'a [Record], name: &str) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| r.name_candidates().any(|candidate| same_species(candidate, name)))
        .collect()
}

fn by_label<'a>(records: &'a [Record], wanted: &str, label: fn(&Record) -> &str) -> Vec<&'a Record> {
    records.iter().filter(|r| same_label(label(r), wanted)).collect()
}

fn by_status_species<'a>(records: &'a [Record], taxonomy: &StatusTaxonomy, name: &str) -> Vec<&'a Record> {
    let Some(entry) = taxonomy.lookup(name) else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|r| taxonomy.match_record(r) == Some(entry))
        .collect()
}

fn by_status_list<'a>(
    records: &'a [Record],
    taxonomy: &StatusTaxonomy,
    list: &str,
    class: Option<&str>,
) -> Vec<&'a Record> {
    let Some(list_idx) = taxonomy.list_index(list) else {
        return Vec::new();
    };
    records
        .iter()
        .filter(|r| matches!(taxonomy.match_record(r), Some(id) if id.list == list_idx))
        .filter(|r| class.is_none_or(|c| same_label(r.class_label(), c)))
        .collect()
}
