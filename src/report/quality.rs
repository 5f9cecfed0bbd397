//! Stage-aware issue registry over flag matrices and duplicate analysis.
//!
//! Each emitted row joins the matching rule-catalog entry, and the builder
//! refuses to emit a row whose `(stage, rule_id)` is absent from the
//! catalog: a broken catalog link means the report cannot be joined
//! downstream, so it fails the run instead of degrading quietly.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dedup::{DuplicateGroupReport, RowDuplicateMetadata};
use crate::error::ReportError;
use crate::records::{RecordKey, SsnColumn};
use crate::rules::{
    catalog_index, duplicate_rule, ApplicationRuleKey, CatalogEntry, CountUnit, DatasetScope,
    IssueKind, RuleFamily, Severity, SpendingRuleKey, Stage, ValueSource,
};
use crate::validate::FlagMatrix;

use super::round2;

/// Cap on distinct example ids quoted per issue row.
const MAX_EXAMPLE_IDS: usize = 5;

/// One reported issue at one stage, annotated with its catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueRow {
    pub stage: Stage,
    pub issue_type: IssueKind,
    pub field_path: String,
    pub rule_id: String,
    pub description: String,
    pub count: usize,
    pub percent: f64,
    pub severity: Severity,
    /// Pipe-delimited, distinct, sorted, capped sample of affected ids.
    pub example_application_ids: String,
    pub rule_key: String,
    pub rule_family: RuleFamily,
    pub field_path_annotated: Option<String>,
    pub source_columns: String,
    pub value_source: ValueSource,
    pub dataset_scope: DatasetScope,
    pub denominator: String,
    pub count_unit: CountUnit,
}

struct PendingIssue {
    rule_id: &'static str,
    issue_type: IssueKind,
    field_path: &'static str,
    severity: Severity,
    description: &'static str,
    count: usize,
    percent: f64,
    example_application_ids: String,
}

/// Build the issue registry for one stage.
///
/// Rules with no flagged rows are omitted; the four duplicate metrics are
/// computed from the resolver outputs rather than the flag matrices.
/// Rows are ordered by `(stage, severity, count descending, rule_id)`.
#[allow(clippy::too_many_arguments)]
pub fn build_data_quality_report<A, S>(
    applications: &[A],
    application_flags: &FlagMatrix<ApplicationRuleKey>,
    duplicate_report: &[DuplicateGroupReport],
    duplicate_metadata: &[RowDuplicateMetadata],
    spending: &[S],
    spending_flags: &FlagMatrix<SpendingRuleKey>,
    stage: Stage,
    catalog: &[CatalogEntry],
) -> Result<Vec<IssueRow>, ReportError>
where
    A: RecordKey + SsnColumn,
    S: RecordKey,
{
    let app_denominator = applications.len();
    let spending_denominator = spending.len();
    let mut pending = Vec::new();

    for key in ApplicationRuleKey::ALL {
        let count = application_flags.count(key);
        if count == 0 {
            continue;
        }
        let def = key.def();
        pending.push(PendingIssue {
            rule_id: def.rule_id,
            issue_type: def.issue,
            field_path: def.field_path,
            severity: def.severity,
            description: def.description,
            count,
            percent: percent_of(count, app_denominator),
            example_application_ids: example_ids(
                application_flags
                    .flagged_rows(key)
                    .into_iter()
                    .map(|index| applications[index].application_id()),
            ),
        });
    }

    if app_denominator > 0 {
        pending.extend(duplicate_issues(
            applications,
            duplicate_report,
            duplicate_metadata,
            app_denominator,
        ));
    }

    for key in SpendingRuleKey::ALL {
        let count = spending_flags.count(key);
        if count == 0 {
            continue;
        }
        let def = key.def();
        pending.push(PendingIssue {
            rule_id: def.rule_id,
            issue_type: def.issue,
            field_path: def.field_path,
            severity: def.severity,
            description: def.description,
            count,
            percent: percent_of(count, spending_denominator),
            example_application_ids: example_ids(
                spending_flags
                    .flagged_rows(key)
                    .into_iter()
                    .map(|index| spending[index].application_id()),
            ),
        });
    }

    check_catalog_coverage(
        "data_quality_report",
        pending.iter().map(|issue| (stage, issue.rule_id)),
        catalog,
    )?;

    let index = catalog_index(catalog);
    let mut report: Vec<IssueRow> = pending
        .into_iter()
        .filter_map(|issue| {
            index
                .get(&(stage, issue.rule_id))
                .map(|entry| annotated_row(stage, issue, entry))
        })
        .collect();

    report.sort_by(|a, b| {
        a.stage
            .cmp(&b.stage)
            .then(a.severity.cmp(&b.severity))
            .then(b.count.cmp(&a.count))
            .then_with(|| a.rule_id.cmp(&b.rule_id))
    });

    debug!(
        stage = stage.as_str(),
        issues = report.len(),
        "Built data quality report"
    );
    Ok(report)
}

/// Fail when any `(stage, rule_id)` pair is absent from the catalog.
pub fn check_catalog_coverage<'a, I>(
    report_name: &str,
    pairs: I,
    catalog: &[CatalogEntry],
) -> Result<(), ReportError>
where
    I: IntoIterator<Item = (Stage, &'a str)>,
{
    let index = catalog_index(catalog);
    let mut missing: BTreeMap<Stage, BTreeSet<&str>> = BTreeMap::new();
    for (stage, rule_id) in pairs {
        if !index.contains_key(&(stage, rule_id)) {
            missing.entry(stage).or_default().insert(rule_id);
        }
    }
    if missing.is_empty() {
        return Ok(());
    }

    let details = missing
        .iter()
        .map(|(stage, ids)| {
            format!(
                "{}: {}",
                stage.as_str(),
                ids.iter().copied().collect::<Vec<_>>().join(", ")
            )
        })
        .collect::<Vec<_>>()
        .join("; ");
    Err(ReportError::MissingCatalogRules {
        report: report_name.to_string(),
        details,
    })
}

/// The four uniqueness metrics, computed from resolver outputs.
fn duplicate_issues<A>(
    applications: &[A],
    duplicate_report: &[DuplicateGroupReport],
    duplicate_metadata: &[RowDuplicateMetadata],
    app_denominator: usize,
) -> Vec<PendingIssue>
where
    A: RecordKey + SsnColumn,
{
    let duplicate_row_indices: Vec<usize> = duplicate_metadata
        .iter()
        .enumerate()
        .filter(|(_, meta)| meta.is_duplicate_id)
        .map(|(index, _)| index)
        .collect();
    let duplicate_row_examples = example_ids(
        duplicate_row_indices
            .iter()
            .map(|&index| duplicate_metadata[index].application_id.as_deref()),
    );
    let duplicate_group_examples = example_ids(
        duplicate_report
            .iter()
            .map(|group| group.application_id.as_deref()),
    );

    // Non-blank SSNs that occur on more than one row.
    let ssn_values: Vec<&str> = applications
        .iter()
        .map(|row| row.raw_ssn().unwrap_or("").trim())
        .collect();
    let mut ssn_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for ssn in &ssn_values {
        if !ssn.is_empty() {
            *ssn_counts.entry(ssn).or_default() += 1;
        }
    }
    let repeated: BTreeSet<&str> = ssn_counts
        .iter()
        .filter(|(_, &count)| count > 1)
        .map(|(&ssn, _)| ssn)
        .collect();
    let repeated_rows: Vec<usize> = ssn_values
        .iter()
        .enumerate()
        .filter(|(_, ssn)| repeated.contains(*ssn))
        .map(|(index, _)| index)
        .collect();
    let repeated_examples = example_ids(
        repeated_rows
            .iter()
            .map(|&index| applications[index].application_id()),
    );

    // Repeated SSNs linked to more than one distinct application id.
    let mut ssn_to_ids: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
    for (index, ssn) in ssn_values.iter().enumerate() {
        if repeated.contains(ssn) {
            if let Some(id) = applications[index].application_id() {
                ssn_to_ids.entry(ssn).or_default().insert(id);
            }
        }
    }
    let cross_values: BTreeSet<&str> = ssn_to_ids
        .iter()
        .filter(|(_, ids)| ids.len() > 1)
        .map(|(&ssn, _)| ssn)
        .collect();
    let cross_rows: Vec<usize> = ssn_values
        .iter()
        .enumerate()
        .filter(|(_, ssn)| cross_values.contains(*ssn))
        .map(|(index, _)| index)
        .collect();
    let cross_examples = example_ids(
        cross_rows
            .iter()
            .map(|&index| applications[index].application_id()),
    );

    let metrics: [(&str, usize, String); 4] = [
        ("R_DUP_001", duplicate_row_indices.len(), duplicate_row_examples),
        ("R_DUP_002", duplicate_report.len(), duplicate_group_examples),
        ("R_DUP_003", repeated_rows.len(), repeated_examples),
        ("R_DUP_004", cross_values.len(), cross_examples),
    ];

    let mut issues = Vec::new();
    for (rule_id, count, examples) in metrics {
        if count == 0 {
            continue;
        }
        let Some(def) = duplicate_rule(rule_id) else {
            continue;
        };
        issues.push(PendingIssue {
            rule_id: def.rule_id,
            issue_type: def.issue,
            field_path: def.field_path,
            severity: def.severity,
            description: def.description,
            count,
            percent: percent_of(count, app_denominator),
            example_application_ids: examples,
        });
    }
    issues
}

fn annotated_row(stage: Stage, issue: PendingIssue, entry: &CatalogEntry) -> IssueRow {
    IssueRow {
        stage,
        issue_type: issue.issue_type,
        field_path: issue.field_path.to_string(),
        rule_id: issue.rule_id.to_string(),
        description: issue.description.to_string(),
        count: issue.count,
        percent: issue.percent,
        severity: issue.severity,
        example_application_ids: issue.example_application_ids,
        rule_key: entry.rule_key.clone(),
        rule_family: entry.rule_family,
        field_path_annotated: entry.field_path_annotated.clone(),
        source_columns: entry.source_columns.clone(),
        value_source: entry.value_source,
        dataset_scope: entry.dataset_scope,
        denominator: entry.denominator.clone(),
        count_unit: entry.count_unit,
    }
}

fn percent_of(count: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    round2(count as f64 / denominator as f64 * 100.0)
}

/// Distinct, lexicographically sorted, capped, pipe-delimited ids.
/// Rows without an id contribute nothing.
fn example_ids<'a, I>(ids: I) -> String
where
    I: Iterator<Item = Option<&'a str>>,
{
    let distinct: BTreeSet<&str> = ids.flatten().collect();
    distinct
        .into_iter()
        .take(MAX_EXAMPLE_IDS)
        .collect::<Vec<_>>()
        .join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::analyze_duplicate_ids;
    use crate::records::{ApplicationRow, SpendingRow};
    use crate::rules::build_rule_catalog;

    fn app(row_id: u64, id: &str, ssn: Option<&str>) -> ApplicationRow {
        ApplicationRow {
            application_row_id: row_id,
            application_id: Some(id.to_string()),
            raw_applicant_ssn: ssn.map(str::to_string),
            ..Default::default()
        }
    }

    fn flags_with<K: Copy + Ord>(rows: usize, key: K, flagged: &[usize]) -> FlagMatrix<K> {
        let mut matrix = FlagMatrix::new(rows);
        let column = (0..rows).map(|index| flagged.contains(&index)).collect();
        matrix.set_column(key, column);
        matrix
    }

    #[test]
    fn test_zero_count_rules_suppressed() {
        let applications = vec![
            app(0, "APP-2", None),
            app(1, "APP-1", None),
            app(2, "APP-3", None),
        ];
        let flags = flags_with(3, ApplicationRuleKey::BlankEmail, &[0, 1]);
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);
        let catalog = build_rule_catalog();

        let report = build_data_quality_report(
            &applications,
            &flags,
            &dup_report,
            &dup_metadata,
            &Vec::<SpendingRow>::new(),
            &FlagMatrix::new(0),
            Stage::Pre,
            &catalog,
        )
        .unwrap();

        assert_eq!(report.len(), 1);
        let row = &report[0];
        assert_eq!(row.rule_id, "R_APP_004");
        assert_eq!(row.count, 2);
        assert_eq!(row.percent, 66.67);
        assert_eq!(row.example_application_ids, "APP-1|APP-2");
        assert_eq!(row.field_path_annotated.as_deref(), Some("raw_applicant_email"));
    }

    #[test]
    fn test_duplicate_metrics() {
        let applications = vec![
            app(0, "APP-1", Some("111-22-3333")),
            app(1, "APP-1", Some("111-22-3333")),
            app(2, "APP-2", Some(" 999-88-7777 ")),
            app(3, "APP-3", Some("999-88-7777")),
        ];
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);
        let catalog = build_rule_catalog();

        let report = build_data_quality_report(
            &applications,
            &FlagMatrix::new(4),
            &dup_report,
            &dup_metadata,
            &Vec::<SpendingRow>::new(),
            &FlagMatrix::new(0),
            Stage::Pre,
            &catalog,
        )
        .unwrap();

        let by_id = |rule_id: &str| report.iter().find(|row| row.rule_id == rule_id).unwrap();
        assert_eq!(by_id("R_DUP_001").count, 2);
        assert_eq!(by_id("R_DUP_001").percent, 50.0);
        assert_eq!(by_id("R_DUP_002").count, 1);
        assert_eq!(by_id("R_DUP_002").example_application_ids, "APP-1");
        // APP-1's SSN repeats within one id, APP-2/APP-3 share another.
        assert_eq!(by_id("R_DUP_003").count, 4);
        assert_eq!(by_id("R_DUP_004").count, 1);
        assert_eq!(
            by_id("R_DUP_004").example_application_ids,
            "APP-2|APP-3"
        );
    }

    #[test]
    fn test_report_ordering() {
        let applications = vec![
            app(0, "APP-1", None),
            app(1, "APP-2", None),
            app(2, "APP-3", None),
        ];
        // Medium-severity rule with a higher count than a high-severity one.
        let mut flags = FlagMatrix::new(3);
        flags.set_column(ApplicationRuleKey::BlankEmail, vec![true, false, false]);
        flags.set_column(
            ApplicationRuleKey::GenderNeedsNormalisation,
            vec![true, true, true],
        );
        flags.set_column(
            ApplicationRuleKey::DobAmbiguousFormat,
            vec![true, true, false],
        );
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);
        let catalog = build_rule_catalog();

        let report = build_data_quality_report(
            &applications,
            &flags,
            &dup_report,
            &dup_metadata,
            &Vec::<SpendingRow>::new(),
            &FlagMatrix::new(0),
            Stage::Post,
            &catalog,
        )
        .unwrap();

        let ids: Vec<&str> = report.iter().map(|row| row.rule_id.as_str()).collect();
        // High severity first; within medium, higher count first.
        assert_eq!(ids, vec!["R_APP_004", "R_APP_006", "R_APP_009"]);
        assert!(report.iter().all(|row| row.stage == Stage::Post));
    }

    #[test]
    fn test_validation_missing_catalog_rule_fails() {
        let applications = vec![app(0, "APP-1", None)];
        let flags = flags_with(1, ApplicationRuleKey::BlankEmail, &[0]);
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);
        let mut catalog = build_rule_catalog();
        catalog.retain(|entry| entry.rule_id != "R_APP_004");

        let error = build_data_quality_report(
            &applications,
            &flags,
            &dup_report,
            &dup_metadata,
            &Vec::<SpendingRow>::new(),
            &FlagMatrix::new(0),
            Stage::Pre,
            &catalog,
        )
        .unwrap_err();

        assert_eq!(
            error.to_string(),
            "data_quality_report contains rule_id values missing from rule catalog: pre: R_APP_004"
        );
    }

    #[test]
    fn test_spending_rules_use_spending_denominator() {
        let applications = vec![app(0, "APP-1", None)];
        let spending = vec![
            SpendingRow {
                application_row_id: 0,
                application_id: Some("APP-1".to_string()),
                spending_index: 0,
                raw_category: None,
                raw_amount: Some("5".to_string()),
            },
            SpendingRow {
                application_row_id: 0,
                application_id: Some("APP-1".to_string()),
                spending_index: 1,
                raw_category: Some("travel".to_string()),
                raw_amount: Some("5".to_string()),
            },
        ];
        let spending_flags = flags_with(2, SpendingRuleKey::MissingCategory, &[0]);
        let (dup_report, dup_metadata) = analyze_duplicate_ids(&applications);
        let catalog = build_rule_catalog();

        let report = build_data_quality_report(
            &applications,
            &FlagMatrix::new(1),
            &dup_report,
            &dup_metadata,
            &spending,
            &spending_flags,
            Stage::Pre,
            &catalog,
        )
        .unwrap();

        let row = report.iter().find(|row| row.rule_id == "R_SPN_001").unwrap();
        assert_eq!(row.count, 1);
        assert_eq!(row.percent, 50.0);
        assert_eq!(row.dataset_scope, DatasetScope::SpendingItems);
    }

    #[test]
    fn test_empty_inputs_produce_empty_report() {
        let catalog = build_rule_catalog();
        let report = build_data_quality_report(
            &Vec::<ApplicationRow>::new(),
            &FlagMatrix::new(0),
            &[],
            &[],
            &Vec::<SpendingRow>::new(),
            &FlagMatrix::new(0),
            Stage::Pre,
            &catalog,
        )
        .unwrap();
        assert!(report.is_empty());
    }
}
