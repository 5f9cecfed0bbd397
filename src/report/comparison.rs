//! Pre-vs-post remediation comparison over a fixed tracked-metric list.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::dedup::{DuplicateClass, DuplicateGroupReport, RowDuplicateMetadata};

use super::quality::IssueRow;
use super::round2;

/// Rules whose movement across cleaning is worth tracking, in report order.
const TRACKED_METRICS: [(&str, &str); 15] = [
    ("Missing required applicant fields", "R_APP_002"),
    ("Missing processing timestamp", "R_APP_001"),
    ("Blank email", "R_APP_004"),
    ("Invalid email format", "R_APP_005"),
    ("Gender requires normalization", "R_APP_006"),
    ("DOB non-ISO format", "R_APP_008"),
    ("Annual income type/coercion issue", "R_APP_010"),
    ("Annual salary field drift", "R_APP_011"),
    ("Negative credit history months", "R_APP_012"),
    ("Negative savings balance", "R_APP_013"),
    ("Debt-to-income out of range", "R_APP_014"),
    ("Approved with credit history <6 months", "R_APP_018"),
    ("Spending missing category", "R_SPN_001"),
    ("Spending amount non-numeric", "R_SPN_002"),
    ("Spending amount negative", "R_SPN_003"),
];

/// One tracked metric before and after cleaning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric: String,
    pub rule_id: String,
    pub pre_count: usize,
    pub pre_percent: f64,
    pub post_count: usize,
    pub post_percent: f64,
    pub delta_count: i64,
    pub delta_percent: f64,
}

/// Compare the pre and post issue reports rule by rule and append the
/// duplicate-resolution outcome rows.
///
/// A rule absent from a report reads as count 0 at 0.0% rather than an
/// error: clean data legitimately drops rows from the registry.
pub fn build_before_after_comparison(
    pre_report: &[IssueRow],
    post_report: &[IssueRow],
    duplicate_report: &[DuplicateGroupReport],
    duplicate_metadata: &[RowDuplicateMetadata],
    total_records: usize,
    canonical_count: usize,
) -> Vec<ComparisonRow> {
    let mut rows: Vec<ComparisonRow> = TRACKED_METRICS
        .iter()
        .map(|(metric, rule_id)| {
            let (pre_count, pre_percent) = lookup_metric(pre_report, rule_id);
            let (post_count, post_percent) = lookup_metric(post_report, rule_id);
            ComparisonRow {
                metric: (*metric).to_string(),
                rule_id: (*rule_id).to_string(),
                pre_count,
                pre_percent,
                post_count,
                post_percent,
                delta_count: post_count as i64 - pre_count as i64,
                delta_percent: round2(post_percent - pre_percent),
            }
        })
        .collect();

    let duplicate_rows = duplicate_metadata
        .iter()
        .filter(|meta| meta.is_duplicate_id)
        .count();
    let conflict_ids: BTreeSet<&str> = duplicate_report
        .iter()
        .filter(|group| group.classification == DuplicateClass::Conflict)
        .filter_map(|group| group.application_id.as_deref())
        .collect();
    let duplicate_percent = percent_of(duplicate_rows, total_records);
    let conflict_percent = percent_of(conflict_ids.len(), total_records);
    let canonical_percent = percent_of(canonical_count, total_records);

    // Duplication is a property of raw identity, not content, so the
    // duplicate rows persist unchanged across cleaning.
    rows.push(static_row(
        "Duplicate application_id rows",
        "R_DUP_001",
        duplicate_rows,
        duplicate_percent,
    ));
    rows.push(static_row(
        "Duplicate conflict IDs",
        "R_DUP_CONFLICT",
        conflict_ids.len(),
        conflict_percent,
    ));
    rows.push(ComparisonRow {
        metric: "Canonical rows selected for analysis".to_string(),
        rule_id: "R_DUP_CANONICAL".to_string(),
        pre_count: total_records,
        pre_percent: if total_records > 0 { 100.0 } else { 0.0 },
        post_count: canonical_count,
        post_percent: canonical_percent,
        delta_count: canonical_count as i64 - total_records as i64,
        delta_percent: if total_records > 0 {
            round2(canonical_percent - 100.0)
        } else {
            0.0
        },
    });

    rows
}

fn lookup_metric(report: &[IssueRow], rule_id: &str) -> (usize, f64) {
    report
        .iter()
        .find(|row| row.rule_id == rule_id)
        .map_or((0, 0.0), |row| (row.count, round2(row.percent)))
}

fn static_row(metric: &str, rule_id: &str, count: usize, percent: f64) -> ComparisonRow {
    ComparisonRow {
        metric: metric.to_string(),
        rule_id: rule_id.to_string(),
        pre_count: count,
        pre_percent: percent,
        post_count: count,
        post_percent: percent,
        delta_count: 0,
        delta_percent: 0.0,
    }
}

fn percent_of(count: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(count as f64 / denominator as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::analyze_duplicate_ids;
    use crate::records::{ApplicationRow, SpendingRow};
    use crate::rules::{build_rule_catalog, ApplicationRuleKey, Stage};
    use crate::report::quality::build_data_quality_report;
    use crate::validate::FlagMatrix;

    fn app(row_id: u64, id: &str) -> ApplicationRow {
        ApplicationRow {
            application_row_id: row_id,
            application_id: Some(id.to_string()),
            ..Default::default()
        }
    }

    fn report_with(
        applications: &[ApplicationRow],
        key: ApplicationRuleKey,
        flagged: &[usize],
        stage: Stage,
    ) -> Vec<IssueRow> {
        let mut flags = FlagMatrix::new(applications.len());
        flags.set_column(
            key,
            (0..applications.len())
                .map(|index| flagged.contains(&index))
                .collect(),
        );
        let (dup_report, dup_metadata) = analyze_duplicate_ids(applications);
        build_data_quality_report(
            applications,
            &flags,
            &dup_report,
            &dup_metadata,
            &Vec::<SpendingRow>::new(),
            &FlagMatrix::new(0),
            stage,
            &build_rule_catalog(),
        )
        .unwrap()
    }

    #[test]
    fn test_tracked_rule_delta() {
        let applications = vec![app(0, "APP-1"), app(1, "APP-2"), app(2, "APP-3"), app(3, "APP-4")];
        let pre = report_with(&applications, ApplicationRuleKey::BlankEmail, &[0, 1, 2], Stage::Pre);
        let post = report_with(&applications, ApplicationRuleKey::BlankEmail, &[0], Stage::Post);
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);

        let comparison =
            build_before_after_comparison(&pre, &post, &dup_report, &dup_metadata, 4, 4);

        let blank_email = comparison
            .iter()
            .find(|row| row.rule_id == "R_APP_004")
            .unwrap();
        assert_eq!(blank_email.metric, "Blank email");
        assert_eq!(blank_email.pre_count, 3);
        assert_eq!(blank_email.pre_percent, 75.0);
        assert_eq!(blank_email.post_count, 1);
        assert_eq!(blank_email.post_percent, 25.0);
        assert_eq!(blank_email.delta_count, -2);
        assert_eq!(blank_email.delta_percent, -50.0);
    }

    #[test]
    fn test_rule_absent_from_both_reports_is_all_zero() {
        let applications = vec![app(0, "APP-1")];
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);
        let comparison =
            build_before_after_comparison(&[], &[], &dup_report, &dup_metadata, 1, 1);

        let timestamp = comparison
            .iter()
            .find(|row| row.rule_id == "R_APP_001")
            .unwrap();
        assert_eq!(timestamp.pre_count, 0);
        assert_eq!(timestamp.pre_percent, 0.0);
        assert_eq!(timestamp.post_count, 0);
        assert_eq!(timestamp.delta_count, 0);
        assert_eq!(timestamp.delta_percent, 0.0);
    }

    #[test]
    fn test_metric_order_is_fixed() {
        let comparison = build_before_after_comparison(&[], &[], &[], &[], 0, 0);
        let ids: Vec<&str> = comparison.iter().map(|row| row.rule_id.as_str()).collect();
        assert_eq!(ids.len(), 18);
        assert_eq!(ids[0], "R_APP_002");
        assert_eq!(ids[1], "R_APP_001");
        assert_eq!(ids[14], "R_SPN_003");
        assert_eq!(
            &ids[15..],
            &["R_DUP_001", "R_DUP_CONFLICT", "R_DUP_CANONICAL"]
        );
    }

    #[test]
    fn test_duplicate_rows_static_across_stages() {
        let applications = vec![app(0, "APP-1"), app(1, "APP-1"), app(2, "APP-2")];
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);
        let comparison =
            build_before_after_comparison(&[], &[], &dup_report, &dup_metadata, 3, 2);

        let duplicates = comparison
            .iter()
            .find(|row| row.rule_id == "R_DUP_001")
            .unwrap();
        assert_eq!(duplicates.pre_count, 2);
        assert_eq!(duplicates.post_count, 2);
        assert_eq!(duplicates.pre_percent, 66.67);
        assert_eq!(duplicates.delta_count, 0);
        assert_eq!(duplicates.delta_percent, 0.0);
    }

    #[test]
    fn test_canonical_retention_row() {
        let applications = vec![app(0, "APP-1"), app(1, "APP-1"), app(2, "APP-2")];
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);
        let comparison =
            build_before_after_comparison(&[], &[], &dup_report, &dup_metadata, 3, 2);

        let canonical = comparison
            .iter()
            .find(|row| row.rule_id == "R_DUP_CANONICAL")
            .unwrap();
        assert_eq!(canonical.pre_count, 3);
        assert_eq!(canonical.pre_percent, 100.0);
        assert_eq!(canonical.post_count, 2);
        assert_eq!(canonical.post_percent, 66.67);
        assert_eq!(canonical.delta_count, -1);
        assert_eq!(canonical.delta_percent, -33.33);
    }

    #[test]
    fn test_zero_total_records_yields_zero_percents() {
        let comparison = build_before_after_comparison(&[], &[], &[], &[], 0, 0);
        let canonical = comparison
            .iter()
            .find(|row| row.rule_id == "R_DUP_CANONICAL")
            .unwrap();
        assert_eq!(canonical.pre_percent, 0.0);
        assert_eq!(canonical.post_percent, 0.0);
        assert_eq!(canonical.delta_percent, 0.0);
    }
}
