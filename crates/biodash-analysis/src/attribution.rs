//! Data attribution and provider summaries
//!
//! Every record set carries the credit lines its licences require, plus two
//! provenance tables: records grouped by provider and the distinct
//! dataset/licence pairs.

use crate::license::{license_info, LicenseInfo};
use biodash_common::Record;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub const UNKNOWN_PROVIDER: &str = "(unknown provider)";
pub const UNKNOWN_DATASET: &str = "(unknown dataset)";

/// One credit line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribution {
    pub provider: String,
    pub dataset: String,
    pub license: LicenseInfo,
    pub credit: String,
}

/// A dataset and the licence it was published under
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetLicense {
    pub dataset: String,
    pub license: LicenseInfo,
}

/// Records from one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderGroup {
    pub provider: String,
    pub record_count: usize,
    /// Distinct pairs in first-seen order
    pub datasets: Vec<DatasetLicense>,
}

/// One row of the distinct dataset/licence table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatasetSummary {
    pub dataset: String,
    pub license: LicenseInfo,
    pub providers: usize,
    pub records: usize,
}

fn provider_of(record: &Record) -> &str {
    non_blank(&record.provider).unwrap_or(UNKNOWN_PROVIDER)
}

fn dataset_of(record: &Record) -> &str {
    non_blank(&record.data_resource_name).unwrap_or(UNKNOWN_DATASET)
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// The sentence crediting `provider` for `dataset`.
pub fn credit_line(provider: &str, dataset: &str, license: &LicenseInfo) -> String {
    if license.is_public_domain() {
        format!(
            "Uses data {} — {}, licensed under {}.",
            provider, dataset, license.label
        )
    } else {
        format!(
            "Contains data © {}, from {}, licensed under {}.",
            provider, dataset, license.label
        )
    }
}

/// Unique provider/dataset/licence combinations, by provider then dataset.
pub fn attribution(records: &[Record]) -> Vec<Attribution> {
    let unique: BTreeSet<(&str, &str, String)> = records
        .iter()
        .map(|r| (provider_of(r), dataset_of(r), r.license.trim().to_uppercase()))
        .collect();

    unique
        .into_iter()
        .map(|(provider, dataset, code)| {
            let license = license_info(&code);
            Attribution {
                credit: credit_line(provider, dataset, &license),
                provider: provider.to_string(),
                dataset: dataset.to_string(),
                license,
            }
        })
        .collect()
}

/// Records grouped by provider, sorted by provider name.
pub fn provider_groups(records: &[Record]) -> Vec<ProviderGroup> {
    let mut groups: BTreeMap<&str, (usize, Vec<(&str, String)>)> = BTreeMap::new();

    for record in records {
        let (count, pairs) = groups.entry(provider_of(record)).or_default();
        *count += 1;

        let pair = (dataset_of(record), record.license.trim().to_uppercase());
        if !pairs.contains(&pair) {
            pairs.push(pair);
        }
    }

    groups
        .into_iter()
        .map(|(provider, (record_count, pairs))| ProviderGroup {
            provider: provider.to_string(),
            record_count,
            datasets: pairs
                .into_iter()
                .map(|(dataset, code)| DatasetLicense {
                    dataset: dataset.to_string(),
                    license: license_info(&code),
                })
                .collect(),
        })
        .collect()
}

/// Distinct dataset/licence pairs with their provider and record counts.
pub fn dataset_summary(records: &[Record]) -> Vec<DatasetSummary> {
    let mut rows: BTreeMap<(&str, String), (HashSet<&str>, usize)> = BTreeMap::new();

    for record in records {
        let (providers, count) = rows
            .entry((dataset_of(record), record.license.trim().to_uppercase()))
            .or_default();
        providers.insert(provider_of(record));
        *count += 1;
    }

    rows.into_iter()
        .map(|((dataset, code), (providers, records))| DatasetSummary {
            dataset: dataset.to_string(),
            license: license_info(&code),
            providers: providers.len(),
            records,
        })
        .collect()
}
