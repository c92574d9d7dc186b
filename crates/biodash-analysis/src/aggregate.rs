//! Aggregate views over a record set
//!
//! [`aggregate`] derives the seven dashboard views from one pass over the
//! records. Every view is rebuilt from scratch; an empty record set yields
//! empty views.

use biodash_common::Record;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Number of rows kept by the ranked views.
pub const TOP_N: usize = 10;

/// A label and how many records carry it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: usize,
}

impl CountRow {
    pub fn new(label: impl Into<String>, count: usize) -> Self {
        Self {
            label: label.into(),
            count,
        }
    }
}

/// One row of the species ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesCount {
    /// The records' shared `speciesKey`
    pub key: String,
    pub display: String,
    pub count: usize,
    /// Status list of the species, once annotated against a taxonomy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Month x class count matrix.
///
/// `counts[i][j]` is the number of records in `months[i]` with class
/// `classes[j]`. Every row has one cell per class, zero included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassByMonth {
    pub months: Vec<String>,
    pub classes: Vec<String>,
    pub counts: Vec<Vec<usize>>,
}

impl ClassByMonth {
    pub fn get(&self, month: &str, class: &str) -> Option<usize> {
        let row = self.months.iter().position(|m| m == month)?;
        let col = self.classes.iter().position(|c| c == class)?;
        self.counts.get(row)?.get(col).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }
}

/// All aggregate views of one record set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    /// Records per `YYYY-MM`, ascending
    pub by_month: Vec<CountRow>,
    /// At most [`TOP_N`] species by descending count, ties by display name
    pub top_species: Vec<SpeciesCount>,
    /// Records per class, ascending by class
    pub by_class: Vec<CountRow>,
    /// Records per basis of record, ascending
    pub by_basis: Vec<CountRow>,
    /// At most [`TOP_N`] providers by descending count, ties by name
    pub top_providers: Vec<CountRow>,
    /// Distinct species names per month, ascending
    pub richness_by_month: Vec<CountRow>,
    pub class_by_month: ClassByMonth,
}

/// Compute every aggregate view.
///
/// Records without a parseable date are left out of the three monthly views
/// only. Richness counts distinct display names and skips unnamed records.
pub fn aggregate(records: &[Record]) -> Aggregates {
    let mut by_month: BTreeMap<String, usize> = BTreeMap::new();
    let mut richness: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    let mut month_class: BTreeMap<String, BTreeMap<&str, usize>> = BTreeMap::new();
    let mut all_classes: BTreeSet<&str> = BTreeSet::new();

    let mut by_class: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_basis: BTreeMap<&str, usize> = BTreeMap::new();
    let mut by_provider: HashMap<&str, usize> = HashMap::new();

    // speciesKey -> (first display seen, count)
    let mut species: HashMap<&str, (&str, usize)> = HashMap::new();

    for record in records {
        let class = record.class_label();

        *by_class.entry(class).or_default() += 1;
        *by_basis.entry(record.basis_label()).or_default() += 1;
        *by_provider.entry(record.provider_label()).or_default() += 1;
        species
            .entry(record.species_key.as_str())
            .or_insert((record.species_display.as_str(), 0))
            .1 += 1;

        let Some(month) = record.event_month() else {
            continue;
        };

        *by_month.entry(month.clone()).or_default() += 1;
        if record.is_named() {
            richness
                .entry(month.clone())
                .or_default()
                .insert(record.species_display.as_str());
        }
        all_classes.insert(class);
        *month_class.entry(month).or_default().entry(class).or_default() += 1;
    }

    let mut top_species: Vec<SpeciesCount> = species
        .into_iter()
        .map(|(key, (display, count))| SpeciesCount {
            key: key.to_string(),
            display: display.to_string(),
            count,
            status: None,
        })
        .collect();
    top_species.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.display.cmp(&b.display))
            .then_with(|| a.key.cmp(&b.key))
    });
    top_species.truncate(TOP_N);

    let classes: Vec<String> = all_classes.iter().map(|c| c.to_string()).collect();
    let class_by_month = ClassByMonth {
        months: month_class.keys().cloned().collect(),
        counts: month_class
            .values()
            .map(|row| {
                all_classes
                    .iter()
                    .map(|class| row.get(class).copied().unwrap_or(0))
                    .collect()
            })
            .collect(),
        classes,
    };

    Aggregates {
        by_month: rows(by_month),
        top_species,
        by_class: rows(by_class),
        by_basis: rows(by_basis),
        top_providers: ranked(by_provider, TOP_N),
        richness_by_month: richness
            .into_iter()
            .map(|(month, names)| CountRow::new(month, names.len()))
            .collect(),
        class_by_month,
    }
}

fn rows<K: Into<String>>(counts: BTreeMap<K, usize>) -> Vec<CountRow> {
    counts
        .into_iter()
        .map(|(label, count)| CountRow::new(label, count))
        .collect()
}

/// Descending count, then ascending label; truncated to `limit`.
pub(crate) fn ranked(counts: HashMap<&str, usize>, limit: usize) -> Vec<CountRow> {
    let mut out: Vec<CountRow> = counts
        .into_iter()
        .map(|(label, count)| CountRow::new(label, count))
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    out.truncate(limit);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use biodash_common::UNKNOWN;
    use proptest::prelude::*;

    fn record(display: &str, class: &str, date: &str) -> Record {
        Record {
            species_key: display.to_lowercase(),
            species_display: display.to_string(),
            vernacular_name: display.to_string(),
            class_name: class.to_string(),
            event_date_str: date.to_string(),
            ..Default::default()
        }
    }

    fn count(rows: &[CountRow], label: &str) -> Option<usize> {
        rows.iter().find(|r| r.label == label).map(|r| r.count)
    }

    #[test]
    fn test_empty_records() {
        assert_eq!(aggregate(&[]), Aggregates::default());
    }

    #[test]
    fn test_by_month_prefers_event_date() {
        let mut r = record("Robin", "Aves", "");
        r.occurrence_year_str = "2023-01-01 00:00:00".to_string();
        let records = vec![
            record("Robin", "Aves", "2024-05-02 10:00:00"),
            record("Wren", "Aves", "2024-05-30 10:00:00"),
            record("Wren", "Aves", "2024-04-01 00:00:00"),
            r,
            record("Nobody", "Aves", "garbage"),
        ];
        let views = aggregate(&records);
        assert_eq!(
            views.by_month,
            vec![
                CountRow::new("2023-01", 1),
                CountRow::new("2024-04", 1),
                CountRow::new("2024-05", 2),
            ]
        );
        // The undated record still counts elsewhere
        assert_eq!(count(&views.by_class, "Aves"), Some(5));
    }

    #[test]
    fn test_top_species_ranking_and_tie_break() {
        let mut records = Vec::new();
        for (name, n) in [("Wren", 2), ("Blackbird", 2), ("Robin", 3), ("Jay", 1)] {
            for _ in 0..n {
                records.push(record(name, "Aves", ""));
            }
        }
        let top: Vec<_> = aggregate(&records)
            .top_species
            .into_iter()
            .map(|s| (s.display, s.count))
            .collect();
        assert_eq!(
            top,
            vec![
                ("Robin".to_string(), 3),
                ("Blackbird".to_string(), 2),
                ("Wren".to_string(), 2),
                ("Jay".to_string(), 1),
            ]
        );
    }

    #[test]
    fn test_top_species_groups_by_key() {
        let mut a = record("Fallow Deer", "Mammalia", "");
        a.species_key = "dama dama".to_string();
        let mut b = record("Dama dama", "Mammalia", "");
        b.species_key = "dama dama".to_string();

        let top = aggregate(&[a, b]).top_species;
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].display, "Fallow Deer");
    }

    #[test]
    fn test_top_lists_truncate() {
        let records: Vec<_> = (0..15)
            .map(|i| {
                let mut r = record(&format!("sp{i:02}"), "Aves", "");
                r.provider = format!("provider {i:02}");
                r
            })
            .collect();
        let views = aggregate(&records);
        assert_eq!(views.top_species.len(), TOP_N);
        assert_eq!(views.top_providers.len(), TOP_N);
        assert_eq!(views.top_providers[0].label, "provider 00");
    }

    #[test]
    fn test_unknown_labels() {
        let mut r = record("Robin", "  ", "");
        r.provider = " ".to_string();
        let views = aggregate(&[r]);
        assert_eq!(count(&views.by_class, UNKNOWN), Some(1));
        assert_eq!(count(&views.by_basis, UNKNOWN), Some(1));
        assert_eq!(count(&views.top_providers, UNKNOWN), Some(1));
    }

    #[test]
    fn test_richness_counts_distinct_names() {
        let mut unnamed = record(UNKNOWN, "Aves", "2024-05-03 00:00:00");
        unnamed.vernacular_name.clear();
        let records = vec![
            record("Robin", "Aves", "2024-05-01 00:00:00"),
            record("Robin", "Aves", "2024-05-02 00:00:00"),
            record("Wren", "Aves", "2024-05-02 00:00:00"),
            unnamed,
        ];
        let views = aggregate(&records);
        assert_eq!(views.richness_by_month, vec![CountRow::new("2024-05", 2)]);
        assert_eq!(count(&views.by_month, "2024-05"), Some(4));
    }

    #[test]
    fn test_class_by_month_fills_zeros() {
        let records = vec![
            record("Robin", "Aves", "2024-04-01 00:00:00"),
            record("Fox", "Mammalia", "2024-05-01 00:00:00"),
            record("Wren", "Aves", "2024-05-01 00:00:00"),
        ];
        let matrix = aggregate(&records).class_by_month;
        assert_eq!(matrix.months, vec!["2024-04", "2024-05"]);
        assert_eq!(matrix.classes, vec!["Aves", "Mammalia"]);
        assert_eq!(matrix.counts, vec![vec![1, 0], vec![1, 1]]);
        assert_eq!(matrix.get("2024-04", "Mammalia"), Some(0));
        assert_eq!(matrix.get("2023-01", "Aves"), None);
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        (
            prop::sample::select(vec!["Robin", "Wren", "Jay", ""]),
            prop::sample::select(vec!["Aves", "Mammalia", ""]),
            prop::sample::select(vec![
                "2024-01-05 00:00:00",
                "2024-02-10 12:00:00",
                "2023-12-31 23:59:59",
                "",
                "not a date",
            ]),
        )
            .prop_map(|(name, class, date)| {
                let display = if name.is_empty() { UNKNOWN } else { name };
                let mut r = record(display, class, date);
                r.vernacular_name = name.to_string();
                r
            })
    }

    proptest! {
        #[test]
        fn monthly_totals_never_exceed_records(records in prop::collection::vec(arb_record(), 0..40)) {
            let views = aggregate(&records);
            let monthly: usize = views.by_month.iter().map(|r| r.count).sum();
            let dated = records.iter().filter(|r| r.event_month().is_some()).count();
            prop_assert!(monthly <= records.len());
            prop_assert_eq!(monthly, dated);
        }

        #[test]
        fn richness_bounded_by_volume(records in prop::collection::vec(arb_record(), 0..40)) {
            let views = aggregate(&records);
            for row in &views.richness_by_month {
                let volume = count(&views.by_month, &row.label).unwrap_or(0);
                prop_assert!(row.count <= volume);
            }
        }

        #[test]
        fn top_species_sorted(records in prop::collection::vec(arb_record(), 0..40)) {
            let top = aggregate(&records).top_species;
            prop_assert!(top.len() <= TOP_N);
            for pair in top.windows(2) {
                prop_assert!(
                    pair[0].count > pair[1].count
                        || (pair[0].count == pair[1].count && pair[0].display <= pair[1].display)
                );
            }
        }
    }
}
