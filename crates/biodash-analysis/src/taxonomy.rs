//! Conservation-status taxonomy
//!
//! The taxonomy is a curated document grouping species into named status
//! lists:
//!
//! ```json
//! { "lists": [ { "list": "Red", "species": [
//!     { "name": "Curlew", "scientific": "Numenius arquata", "annotation": "BDp" }
//! ] } ] }
//! ```
//!
//! Each entry is indexed under its normalized scientific name and, as an
//! alias, its normalized common name. A key claimed by two entries is a load
//! error, so every record matches at most one entry and one list.

use biodash_common::names::match_key;
use biodash_common::{BiodashError, Record, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, info};

/// One species on a status list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSpecies {
    /// Common name; falls back to the scientific name when blank
    pub name: String,
    pub scientific: String,
    pub annotation: String,
}

/// A named status list in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusList {
    pub name: String,
    pub species: Vec<StatusSpecies>,
}

/// Position of an entry: list index, then species index within the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId {
    pub list: usize,
    pub species: usize,
}

/// One row of the reference table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceRow {
    pub list: String,
    pub species: String,
    pub annotation: String,
}

// ============================================================================
// Document format
// ============================================================================

#[derive(Debug, Deserialize)]
struct TaxonomyDocument {
    #[serde(default)]
    lists: Vec<ListDocument>,
}

#[derive(Debug, Deserialize)]
struct ListDocument {
    list: String,
    #[serde(default)]
    species: Vec<SpeciesDocument>,
}

#[derive(Debug, Deserialize)]
struct SpeciesDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    scientific: Option<String>,
    #[serde(default)]
    annotation: Option<String>,
}

// ============================================================================
// StatusTaxonomy
// ============================================================================

/// Validated status taxonomy with its name index
#[derive(Debug, Clone)]
pub struct StatusTaxonomy {
    lists: Vec<StatusList>,
    index: HashMap<String, EntryId>,
}

impl StatusTaxonomy {
    /// Load and validate a taxonomy file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BiodashError::taxonomy(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let taxonomy = Self::from_json(&content)?;

        info!(
            path = %path.display(),
            lists = taxonomy.lists.len(),
            species = taxonomy.species_count(),
            "Loaded status taxonomy"
        );
        Ok(taxonomy)
    }

    /// Parse and validate a taxonomy document.
    pub fn from_json(content: &str) -> Result<Self> {
        let document: TaxonomyDocument = serde_json::from_str(content)
            .map_err(|e| BiodashError::taxonomy(format!("Invalid taxonomy document: {}", e)))?;
        Self::from_document(document)
    }

    fn from_document(document: TaxonomyDocument) -> Result<Self> {
        let mut lists: Vec<StatusList> = Vec::with_capacity(document.lists.len());
        let mut index: HashMap<String, EntryId> = HashMap::new();

        for (list_idx, list_doc) in document.lists.into_iter().enumerate() {
            let list_name = list_doc.list.trim().to_string();
            if list_name.is_empty() {
                return Err(BiodashError::taxonomy(format!(
                    "List {} has no name",
                    list_idx + 1
                )));
            }
            if lists.iter().any(|l| l.name == list_name) {
                return Err(BiodashError::taxonomy(format!(
                    "List '{}' appears more than once",
                    list_name
                )));
            }

            let mut species = Vec::with_capacity(list_doc.species.len());
            for (species_idx, entry) in list_doc.species.into_iter().enumerate() {
                let id = EntryId {
                    list: list_idx,
                    species: species_idx,
                };
                let entry = Self::validate_entry(&list_name, species_idx, entry)?;

                for name in [&entry.scientific, &entry.name] {
                    let Some(key) = match_key(name) else {
                        continue;
                    };
                    match index.get(&key) {
                        Some(existing) if *existing != id => {
                            let other = Self::describe(&lists, &list_name, &species, *existing);
                            return Err(BiodashError::taxonomy(format!(
                                "'{}' in list '{}' clashes with {}",
                                name, list_name, other
                            )));
                        },
                        Some(_) => {},
                        None => {
                            index.insert(key, id);
                        },
                    }
                }
                species.push(entry);
            }

            debug!(list = %list_name, species = species.len(), "Indexed status list");
            lists.push(StatusList {
                name: list_name,
                species,
            });
        }

        Ok(Self { lists, index })
    }

    fn validate_entry(list: &str, position: usize, entry: SpeciesDocument) -> Result<StatusSpecies> {
        let scientific = entry.scientific.unwrap_or_default().trim().to_string();
        let name = entry.name.unwrap_or_default().trim().to_string();

        if match_key(&scientific).is_none() {
            let label = if name.is_empty() {
                format!("entry {}", position + 1)
            } else {
                format!("'{}'", name)
            };
            return Err(BiodashError::taxonomy(format!(
                "{} in list '{}' has no scientific name",
                label, list
            )));
        }

        Ok(StatusSpecies {
            name: if name.is_empty() { scientific.clone() } else { name },
            scientific,
            annotation: entry.annotation.unwrap_or_default().trim().to_string(),
        })
    }

    /// Human description of an already indexed entry, for clash errors
    fn describe(lists: &[StatusList], current: &str, pending: &[StatusSpecies], id: EntryId) -> String {
        let (list, species) = match lists.get(id.list) {
            Some(list) => (list.name.as_str(), list.species.get(id.species)),
            None => (current, pending.get(id.species)),
        };
        match species {
            Some(s) => format!("'{}' ({}) in list '{}'", s.name, s.scientific, list),
            None => format!("an entry in list '{}'", list),
        }
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn lists(&self) -> &[StatusList] {
        &self.lists
    }

    pub fn list_names(&self) -> impl Iterator<Item = &str> {
        self.lists.iter().map(|l| l.name.as_str())
    }

    /// Position of a list by name
    pub fn list_index(&self, name: &str) -> Option<usize> {
        self.lists.iter().position(|l| l.name == name.trim())
    }

    pub fn species_count(&self) -> usize {
        self.lists.iter().map(|l| l.species.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.species_count() == 0
    }

    pub fn entry(&self, id: EntryId) -> Option<&StatusSpecies> {
        self.lists.get(id.list)?.species.get(id.species)
    }

    pub fn list_name(&self, id: EntryId) -> Option<&str> {
        self.lists.get(id.list).map(|l| l.name.as_str())
    }

    // ------------------------------------------------------------------------
    // Matching
    // ------------------------------------------------------------------------

    /// Entry whose scientific or common name normalizes like `name`.
    /// Blank names never match.
    pub fn lookup(&self, name: &str) -> Option<EntryId> {
        self.index.get(&match_key(name)?).copied()
    }

    /// Entry a record is attributed to: its first name candidate that
    /// matches decides.
    pub fn match_record(&self, record: &Record) -> Option<EntryId> {
        record.name_candidates().find_map(|name| self.lookup(name))
    }

    /// Status list of a record, if any
    pub fn status_for(&self, record: &Record) -> Option<&str> {
        self.list_name(self.match_record(record)?)
    }

    /// Every `(list, species, annotation)` in document order.
    pub fn reference_rows(&self) -> Vec<ReferenceRow> {
        self.lists
            .iter()
            .flat_map(|list| {
                list.species.iter().map(move |s| ReferenceRow {
                    list: list.name.clone(),
                    species: s.name.clone(),
                    annotation: s.annotation.clone(),
                })
            })
            .collect()
    }
}
