//! Duplicate `application_id` classification and canonical-row selection.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::records::ApplicationRow;
use crate::validate::scalars::parse_utc_timestamp;

/// Columns that legitimately change between resubmissions of the same
/// application. Groups that differ only here are versions, not conflicts.
const VERSIONING_COLUMNS: [&str; 2] = ["raw_processing_timestamp", "raw_notes"];

/// Cap on column names quoted in a group's `example_differences`.
const MAX_EXAMPLE_DIFF_COLUMNS: usize = 6;

/// How a group of rows sharing an `application_id` relates internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateClass {
    /// Single row, nothing to resolve.
    Unique,
    /// Every compared column identical across the group.
    Exact,
    /// Rows differ only in versioning columns, or carry timestamp evidence
    /// that a resubmission happened.
    Versioned,
    /// Divergent content with no timestamp evidence to explain it.
    Conflict,
}

impl DuplicateClass {
    pub fn as_str(self) -> &'static str {
        match self {
            DuplicateClass::Unique => "unique",
            DuplicateClass::Exact => "exact",
            DuplicateClass::Versioned => "versioned",
            DuplicateClass::Conflict => "conflict",
        }
    }
}

/// Why a particular row was selected as canonical for its group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalReason {
    /// Exactly one row carries the group's latest parseable timestamp.
    LatestProcessingTimestamp,
    /// Several rows tie on the latest timestamp; highest row id wins.
    TimestampTieFallbackMaxRowId,
    /// No row has a parseable timestamp; highest row id wins.
    MissingOrUnparseableTimestampFallbackMaxRowId,
}

/// One report row per `application_id` that occurs more than once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroupReport {
    pub application_id: Option<String>,
    pub dup_count: usize,
    pub classification: DuplicateClass,
    pub canonical_row_id: u64,
    pub canonical_reason: CanonicalReason,
    /// Pipe-delimited column names differing between one non-canonical row
    /// and the canonical row; empty when rows are identical.
    pub example_differences: String,
}

/// Per-row duplicate context, emitted for every input row.
///
/// `is_canonical_for_analysis` is the contract the analysis stage filters
/// on: exactly one true row per `application_id`, singletons included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowDuplicateMetadata {
    pub application_row_id: u64,
    pub application_id: Option<String>,
    pub is_duplicate_id: bool,
    pub dup_count: usize,
    /// 1-based position within the group, ordered by row id.
    pub rank_within_id: usize,
    pub is_canonical_for_analysis: bool,
    pub has_conflict: bool,
    pub duplicate_classification: DuplicateClass,
    pub canonical_reason: CanonicalReason,
}

/// Group applications by `application_id`, classify each group and pick one
/// canonical row per group.
///
/// Rows with a missing id form a single group of their own. Unparseable
/// processing timestamps are treated as absent, never as errors. The report
/// is sorted by `application_id` (missing last) and the metadata by
/// `application_row_id`.
pub fn analyze_duplicate_ids(
    rows: &[ApplicationRow],
) -> (Vec<DuplicateGroupReport>, Vec<RowDuplicateMetadata>) {
    let mut groups: BTreeMap<Option<&str>, Vec<&ApplicationRow>> = BTreeMap::new();
    for row in rows {
        groups
            .entry(row.application_id.as_deref())
            .or_default()
            .push(row);
    }

    let mut report = Vec::new();
    let mut metadata = Vec::with_capacity(rows.len());

    for (application_id, mut group) in groups {
        group.sort_by_key(|row| row.application_row_id);

        let parsed: Vec<Option<DateTime<Utc>>> = group
            .iter()
            .map(|row| {
                row.raw_processing_timestamp
                    .as_deref()
                    .and_then(parse_utc_timestamp)
            })
            .collect();
        let (canonical_row_id, canonical_reason) = select_canonical(&group, &parsed);

        let dup_count = group.len();
        let is_duplicate = dup_count > 1;
        let timestamp_present = parsed.iter().any(Option::is_some);

        let classification = if !is_duplicate {
            DuplicateClass::Unique
        } else if rows_identical(&group, &[]) {
            DuplicateClass::Exact
        } else if rows_identical(&group, &VERSIONING_COLUMNS) || timestamp_present {
            DuplicateClass::Versioned
        } else {
            DuplicateClass::Conflict
        };

        if is_duplicate {
            report.push(DuplicateGroupReport {
                application_id: application_id.map(str::to_string),
                dup_count,
                classification,
                canonical_row_id,
                canonical_reason,
                example_differences: example_diff_columns(&group, canonical_row_id),
            });
        }

        for (rank, row) in group.iter().enumerate() {
            metadata.push(RowDuplicateMetadata {
                application_row_id: row.application_row_id,
                application_id: application_id.map(str::to_string),
                is_duplicate_id: is_duplicate,
                dup_count,
                rank_within_id: rank + 1,
                is_canonical_for_analysis: row.application_row_id == canonical_row_id,
                has_conflict: classification == DuplicateClass::Conflict,
                duplicate_classification: classification,
                canonical_reason,
            });
        }
    }

    report.sort_by(|a, b| compare_optional_ids(&a.application_id, &b.application_id));
    metadata.sort_by_key(|row| row.application_row_id);

    debug!(
        groups = report.len(),
        rows = metadata.len(),
        "Classified duplicate application ids"
    );
    (report, metadata)
}

/// Latest parseable timestamp wins; ties and timestamp-free groups fall
/// back to the highest row id.
fn select_canonical(
    group: &[&ApplicationRow],
    parsed: &[Option<DateTime<Utc>>],
) -> (u64, CanonicalReason) {
    if let Some(max_ts) = parsed.iter().flatten().max().copied() {
        let candidates: Vec<u64> = group
            .iter()
            .zip(parsed)
            .filter(|(_, ts)| **ts == Some(max_ts))
            .map(|(row, _)| row.application_row_id)
            .collect();
        if candidates.len() == 1 {
            (candidates[0], CanonicalReason::LatestProcessingTimestamp)
        } else {
            let max_row_id = candidates.iter().copied().max().unwrap_or(0);
            (max_row_id, CanonicalReason::TimestampTieFallbackMaxRowId)
        }
    } else {
        let max_row_id = group
            .iter()
            .map(|row| row.application_row_id)
            .max()
            .unwrap_or(0);
        (
            max_row_id,
            CanonicalReason::MissingOrUnparseableTimestampFallbackMaxRowId,
        )
    }
}

/// Whether every row in the group matches the first row on all comparable
/// columns except the excluded ones. Missing values equal missing values.
fn rows_identical(group: &[&ApplicationRow], excluded: &[&str]) -> bool {
    let Some((first, rest)) = group.split_first() else {
        return true;
    };
    let baseline = first.comparable_columns();
    rest.iter().all(|row| {
        let columns = row.comparable_columns();
        columns.len() == baseline.len()
            && columns.iter().zip(&baseline).all(|(current, base)| {
                current.0 == base.0 && (excluded.contains(&current.0) || current.1 == base.1)
            })
    })
}

/// Column names where the first differing non-canonical row departs from
/// the canonical row, pipe-delimited and capped.
fn example_diff_columns(group: &[&ApplicationRow], canonical_row_id: u64) -> String {
    let Some(canonical) = group
        .iter()
        .find(|row| row.application_row_id == canonical_row_id)
    else {
        return String::new();
    };
    let baseline = canonical.comparable_columns();

    for row in group {
        if row.application_row_id == canonical_row_id {
            continue;
        }
        let columns = row.comparable_columns();
        let differing: Vec<&str> = columns
            .iter()
            .zip(&baseline)
            .filter(|(current, base)| current.1 != base.1)
            .map(|(current, _)| current.0)
            .collect();
        if !differing.is_empty() {
            return differing
                .into_iter()
                .take(MAX_EXAMPLE_DIFF_COLUMNS)
                .collect::<Vec<_>>()
                .join("|");
        }
    }
    String::new()
}

/// Ascending ids with missing ids last, matching the report contract.
fn compare_optional_ids(a: &Option<String>, b: &Option<String>) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
