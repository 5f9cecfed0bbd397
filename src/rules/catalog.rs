//! Consolidated stage-aware rule catalog.
//!
//! The catalog is the governance artifact auditors diff between runs: one
//! row per (stage, rule), annotated with where the rule's values come from
//! at that stage and how its counts should be read. It also backs the
//! referential-integrity gate in [`crate::report`]: no report row may cite
//! a rule id that is absent here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::definition::{
    CountUnit, DatasetScope, DuplicateRuleDef, IssueKind, RuleDef, RuleFamily, Severity, Stage,
    ValueSource, APPLICATION_RULES, DUPLICATE_RULES, SPENDING_RULES,
};

/// One row of the consolidated rule catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub stage: Stage,
    pub rule_id: String,
    pub rule_key: String,
    pub rule_family: RuleFamily,
    pub issue_type: IssueKind,
    pub field_path: String,
    /// Stage-annotated path; absent for duplicate metrics.
    pub field_path_annotated: Option<String>,
    /// Concrete columns read at this stage, pipe-delimited.
    pub source_columns: String,
    pub value_source: ValueSource,
    pub dataset_scope: DatasetScope,
    pub denominator: String,
    pub count_unit: CountUnit,
    pub severity: Severity,
    pub description: String,
}

/// Build the full catalog: every row-level rule at both stages, duplicate
/// metrics at both stages except the post-only KPI pair.
///
/// Rows come out sorted by `(stage, rule_family, rule_id)` with exact
/// duplicates on that key removed, so the artifact is stable across runs.
pub fn build_rule_catalog() -> Vec<CatalogEntry> {
    let mut entries = Vec::with_capacity(
        2 * (APPLICATION_RULES.len() + SPENDING_RULES.len() + DUPLICATE_RULES.len()),
    );

    for stage in [Stage::Pre, Stage::Post] {
        for def in &APPLICATION_RULES {
            entries.push(row_rule_entry(stage, def));
        }
        for def in &SPENDING_RULES {
            entries.push(row_rule_entry(stage, def));
        }
        for def in &DUPLICATE_RULES {
            if def.post_only && stage == Stage::Pre {
                continue;
            }
            entries.push(duplicate_entry(stage, def));
        }
    }

    entries.sort_by(|a, b| {
        (a.stage, a.rule_family, a.rule_id.as_str()).cmp(&(b.stage, b.rule_family, b.rule_id.as_str()))
    });
    entries.dedup_by(|a, b| {
        a.stage == b.stage && a.rule_family == b.rule_family && a.rule_id == b.rule_id
    });
    entries
}

/// Index catalog rows by `(stage, rule_id)` for integrity checks.
pub fn catalog_index(catalog: &[CatalogEntry]) -> BTreeMap<(Stage, &str), &CatalogEntry> {
    catalog
        .iter()
        .map(|entry| ((entry.stage, entry.rule_id.as_str()), entry))
        .collect()
}

fn row_rule_entry(stage: Stage, def: &RuleDef) -> CatalogEntry {
    let scope = match def.family {
        RuleFamily::Spending => DatasetScope::SpendingItems,
        _ => DatasetScope::Applications,
    };
    CatalogEntry {
        stage,
        rule_id: def.rule_id.to_string(),
        rule_key: def.rule_key.to_string(),
        rule_family: def.family,
        issue_type: def.issue,
        field_path: def.field_path.to_string(),
        field_path_annotated: Some(def.annotated_field_path(stage).to_string()),
        source_columns: def.source_columns(stage).to_string(),
        value_source: def.value_source(stage),
        dataset_scope: scope,
        denominator: scope.denominator().to_string(),
        count_unit: CountUnit::Rows,
        severity: def.severity,
        description: def.description.to_string(),
    }
}

fn duplicate_entry(stage: Stage, def: &DuplicateRuleDef) -> CatalogEntry {
    CatalogEntry {
        stage,
        rule_id: def.rule_id.to_string(),
        rule_key: def.rule_key.to_string(),
        rule_family: RuleFamily::Duplicate,
        issue_type: def.issue,
        field_path: def.field_path.to_string(),
        field_path_annotated: None,
        source_columns: def.source_columns.to_string(),
        value_source: def.value_source,
        dataset_scope: DatasetScope::Applications,
        denominator: DatasetScope::Applications.denominator().to_string(),
        count_unit: def.count_unit,
        severity: def.severity,
        description: def.description.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_row_counts_per_stage() {
        let catalog = build_rule_catalog();
        let pre = catalog.iter().filter(|e| e.stage == Stage::Pre).count();
        let post = catalog.iter().filter(|e| e.stage == Stage::Post).count();
        // 19 application + 3 spending + 4 duplicate metrics pre-clean;
        // the two KPI metrics join at post-clean.
        assert_eq!(pre, 26);
        assert_eq!(post, 28);
        assert_eq!(catalog.len(), 54);
    }

    #[test]
    fn test_catalog_sorted_and_unique() {
        let catalog = build_rule_catalog();
        for pair in catalog.windows(2) {
            let a = (&pair[0].stage, &pair[0].rule_family, &pair[0].rule_id);
            let b = (&pair[1].stage, &pair[1].rule_family, &pair[1].rule_id);
            assert!(a < b, "catalog out of order: {a:?} vs {b:?}");
        }
    }

    #[test]
    fn test_kpi_metrics_absent_before_cleaning() {
        let catalog = build_rule_catalog();
        assert!(!catalog
            .iter()
            .any(|e| e.stage == Stage::Pre && e.rule_id == "R_DUP_CONFLICT"));
        assert!(catalog
            .iter()
            .any(|e| e.stage == Stage::Post && e.rule_id == "R_DUP_CANONICAL"));
    }

    #[test]
    fn test_stage_attributes_track_cleaning() {
        let catalog = build_rule_catalog();
        let index = catalog_index(&catalog);

        let pre_ts = index[&(Stage::Pre, "R_APP_001")];
        assert_eq!(pre_ts.source_columns, "raw_processing_timestamp");
        assert_eq!(pre_ts.value_source, ValueSource::Raw);

        let post_ts = index[&(Stage::Post, "R_APP_001")];
        assert_eq!(post_ts.source_columns, "clean_processing_timestamp");
        assert_eq!(post_ts.value_source, ValueSource::Clean);

        let post_ambiguous = index[&(Stage::Post, "R_APP_009")];
        assert_eq!(post_ambiguous.value_source, ValueSource::Derived);
        assert_eq!(
            post_ambiguous.field_path_annotated.as_deref(),
            Some("applicant_info.date_of_birth_raw")
        );
    }

    #[test]
    fn test_denominators_follow_scope() {
        let catalog = build_rule_catalog();
        for entry in &catalog {
            match entry.dataset_scope {
                DatasetScope::Applications => assert_eq!(entry.denominator, "application_rows"),
                DatasetScope::SpendingItems => assert_eq!(entry.denominator, "spending_rows"),
            }
        }
        assert!(catalog
            .iter()
            .filter(|e| e.rule_family == RuleFamily::Spending)
            .all(|e| e.dataset_scope == DatasetScope::SpendingItems));
    }

    #[test]
    fn test_duplicate_metrics_have_no_annotated_path() {
        let catalog = build_rule_catalog();
        for entry in catalog.iter().filter(|e| e.rule_family == RuleFamily::Duplicate) {
            assert_eq!(entry.field_path_annotated, None);
        }
    }
}
