//! Cross-reference of records against the status taxonomy
//!
//! Each record is attributed to at most one taxonomy entry (see
//! [`StatusTaxonomy::match_record`]). Counting is per entry, so two spellings
//! of one species land on the same row and count once as a distinct species.

use crate::aggregate::{CountRow, SpeciesCount};
use crate::taxonomy::{EntryId, StatusTaxonomy};
use biodash_common::Record;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Shown wherever a status view would appear without a taxonomy.
pub const NOT_LOADED: &str = "Status reference not loaded.";

/// Label of the breakdown bucket for records on no list.
pub const OTHER: &str = "Other";

/// A species on a list that the records actually mention
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedSpecies {
    pub name: String,
    pub scientific: String,
    pub annotation: String,
    pub occurrence_count: usize,
}

/// Matches for one status list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSummary {
    pub list: String,
    /// Descending occurrence count, then name
    pub species: Vec<MatchedSpecies>,
    /// Matched records per class
    pub occurrences_by_class: BTreeMap<String, usize>,
    /// Distinct matched species per class
    pub distinct_by_class: BTreeMap<String, usize>,
    /// Sum of `distinct_by_class`
    pub distinct_total: usize,
    pub occurrence_total: usize,
}

impl ListSummary {
    pub fn distinct_in(&self, class: &str) -> usize {
        self.distinct_by_class.get(class).copied().unwrap_or(0)
    }

    pub fn occurrences_in(&self, class: &str) -> usize {
        self.occurrences_by_class.get(class).copied().unwrap_or(0)
    }
}

/// Per-list results, in taxonomy list order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrossReference {
    pub lists: Vec<ListSummary>,
    /// Union of every class with a match, ascending; the matrix columns
    pub classes: Vec<String>,
}

impl CrossReference {
    /// Match every record against `taxonomy`.
    pub fn build(records: &[Record], taxonomy: &StatusTaxonomy) -> Self {
        let mut occurrences: HashMap<EntryId, usize> = HashMap::new();
        let mut class_occurrences: HashMap<usize, BTreeMap<String, usize>> = HashMap::new();
        let mut distinct: HashMap<usize, BTreeMap<String, BTreeSet<EntryId>>> = HashMap::new();

        for record in records {
            let Some(id) = taxonomy.match_record(record) else {
                continue;
            };
            let class = record.class_label();

            *occurrences.entry(id).or_default() += 1;
            *class_occurrences
                .entry(id.list)
                .or_default()
                .entry(class.to_string())
                .or_default() += 1;
            distinct
                .entry(id.list)
                .or_default()
                .entry(class.to_string())
                .or_default()
                .insert(id);
        }

        let mut classes: BTreeSet<String> = BTreeSet::new();
        let lists = taxonomy
            .lists()
            .iter()
            .enumerate()
            .map(|(list_idx, list)| {
                let mut species: Vec<MatchedSpecies> = list
                    .species
                    .iter()
                    .enumerate()
                    .filter_map(|(species_idx, s)| {
                        let id = EntryId {
                            list: list_idx,
                            species: species_idx,
                        };
                        let count = occurrences.get(&id).copied().unwrap_or(0);
                        (count > 0).then(|| MatchedSpecies {
                            name: s.name.clone(),
                            scientific: s.scientific.clone(),
                            annotation: s.annotation.clone(),
                            occurrence_count: count,
                        })
                    })
                    .collect();
                species.sort_by(|a, b| {
                    b.occurrence_count
                        .cmp(&a.occurrence_count)
                        .then_with(|| a.name.cmp(&b.name))
                });

                let occurrences_by_class = class_occurrences.remove(&list_idx).unwrap_or_default();
                let distinct_by_class: BTreeMap<String, usize> = distinct
                    .remove(&list_idx)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(class, set)| (class, set.len()))
                    .collect();
                classes.extend(distinct_by_class.keys().cloned());

                ListSummary {
                    list: list.name.clone(),
                    species,
                    distinct_total: distinct_by_class.values().sum(),
                    occurrence_total: occurrences_by_class.values().sum(),
                    occurrences_by_class,
                    distinct_by_class,
                }
            })
            .collect();

        Self {
            lists,
            classes: classes.into_iter().collect(),
        }
    }

    pub fn list(&self, name: &str) -> Option<&ListSummary> {
        self.lists.iter().find(|l| l.list == name)
    }
}

/// Cross-reference when a taxonomy is loaded; `None` is the "not loaded"
/// state, rendered with [`NOT_LOADED`].
pub fn cross_reference(records: &[Record], taxonomy: Option<&StatusTaxonomy>) -> Option<CrossReference> {
    taxonomy.map(|t| CrossReference::build(records, t))
}

/// Records per status list in taxonomy order, then [`OTHER`].
pub fn status_breakdown(records: &[Record], taxonomy: &StatusTaxonomy) -> Vec<CountRow> {
    let mut counts = vec![0usize; taxonomy.lists().len()];
    let mut other = 0;

    for record in records {
        match taxonomy.match_record(record) {
            Some(id) => counts[id.list] += 1,
            None => other += 1,
        }
    }

    taxonomy
        .list_names()
        .zip(counts)
        .map(|(name, count)| CountRow::new(name, count))
        .chain(std::iter::once(CountRow::new(OTHER, other)))
        .collect()
}

/// Fill in the status list of each ranked species.
///
/// A species takes the status of the first of its records that matches.
pub fn annotate_species_status(top: &mut [SpeciesCount], records: &[Record], taxonomy: &StatusTaxonomy) {
    for row in top.iter_mut() {
        row.status = records
            .iter()
            .filter(|r| r.species_key == row.key)
            .find_map(|r| taxonomy.status_for(r))
            .map(str::to_string);
    }
}
