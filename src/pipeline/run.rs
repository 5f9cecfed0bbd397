//! End-to-end curation run.
//!
//! `run_pipeline` wires the stages in order: ingest and flatten, pre-clean
//! evaluation with duplicate analysis, cleaning, post-clean evaluation,
//! remediation accounting, the privacy-preserving analysis dataset,
//! fairness diagnostics, and finally artifact export. Every stage logs a
//! count; raw identifier values only ever reach the log masked.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, info_span, instrument};

use crate::clean::{clean_applications, clean_spending_items};
use crate::dedup::analyze_duplicate_ids;
use crate::error::{ExportError, PipelineError};
use crate::export::{write_analysis_parquet, write_jsonl};
use crate::fairness::{
    age_approval_table, age_di_table, build_fairness_summary, disparate_impact,
    gender_approval_table, interaction_table, interest_rate_by_gender,
    rejection_reason_by_gender,
};
use crate::ingest::{flatten_applications, flatten_spending_items, load_raw_records};
use crate::privacy::masking::masked_row_preview;
use crate::privacy::{build_analysis_dataset, generate_pii_inventory};
use crate::report::{
    build_before_after_comparison, build_data_quality_report, summarise_cleaning_changes,
};
use crate::rules::{build_rule_catalog, Stage};
use crate::settings::PipelineSettings;
use crate::validate::{
    validate_spending_postclean, validate_spending_preclean, ApplicationValidator,
};

use super::summary::RunSummary;

pub const RULE_CATALOG_FILE: &str = "rule_catalog.jsonl";
pub const DATA_QUALITY_REPORT_FILE: &str = "data_quality_report.jsonl";
pub const DUPLICATE_ID_REPORT_FILE: &str = "duplicate_id_report.jsonl";
pub const DUPLICATE_ID_METADATA_FILE: &str = "duplicate_id_metadata.jsonl";
pub const CLEANING_ACTIONS_FILE: &str = "cleaning_actions.jsonl";
pub const BEFORE_AFTER_COMPARISON_FILE: &str = "before_after_comparison.jsonl";
pub const CURATED_APPLICATIONS_FILE: &str = "curated_applications.jsonl";
pub const CURATED_SPENDING_FILE: &str = "curated_spending.jsonl";
pub const ANALYSIS_DATASET_JSONL_FILE: &str = "analysis_dataset.jsonl";
pub const ANALYSIS_DATASET_PARQUET_FILE: &str = "analysis_dataset.parquet";
pub const PII_INVENTORY_FILE: &str = "pii_inventory.jsonl";
pub const FAIRNESS_SUMMARY_FILE: &str = "fairness_summary.jsonl";
pub const FAIRNESS_GENDER_APPROVAL_FILE: &str = "fairness_gender_approval.jsonl";
pub const FAIRNESS_AGE_APPROVAL_FILE: &str = "fairness_age_approval.jsonl";
pub const FAIRNESS_INTERACTION_FILE: &str = "fairness_interaction.jsonl";
pub const FAIRNESS_AGE_DI_FILE: &str = "fairness_age_di.jsonl";
pub const FAIRNESS_REJECTION_REASONS_FILE: &str = "fairness_rejection_reasons.jsonl";
pub const RUN_SUMMARY_FILE: &str = "run_summary.json";

/// Redacted rows previewed at debug level after flattening.
const DEBUG_PREVIEW_ROWS: usize = 5;

/// Execute the full curation run over one raw export and write every
/// artifact into `output_dir`.
#[instrument(skip(settings))]
pub fn run_pipeline(
    input: &Path,
    output_dir: &Path,
    settings: &PipelineSettings,
) -> Result<RunSummary, PipelineError> {
    fs::create_dir_all(output_dir)?;
    let mut summary = RunSummary::new(input, output_dir);

    let (applications, spending) = {
        let _stage = info_span!("ingest").entered();
        let records = load_raw_records(input)?;
        let applications = flatten_applications(&records);
        let spending = flatten_spending_items(&records);
        info!(
            records = records.len(),
            spending_items = spending.len(),
            "Flattened raw export"
        );
        for row in applications.iter().take(DEBUG_PREVIEW_ROWS) {
            debug!(row = %masked_row_preview(row), "Raw row preview");
        }
        (applications, spending)
    };
    summary.records = applications.len();
    summary.spending_items = spending.len();

    let catalog = build_rule_catalog();
    let validator = ApplicationValidator::new(settings);

    let (pre_report, duplicate_report, duplicate_metadata) = {
        let _stage = info_span!("validate", stage = "pre").entered();
        let application_flags = validator.preclean(&applications);
        let spending_flags = validate_spending_preclean(&spending);
        let (duplicate_report, duplicate_metadata) = analyze_duplicate_ids(&applications);
        let report = build_data_quality_report(
            &applications,
            &application_flags,
            &duplicate_report,
            &duplicate_metadata,
            &spending,
            &spending_flags,
            Stage::Pre,
            &catalog,
        )?;
        info!(
            issues = report.len(),
            duplicate_groups = duplicate_report.len(),
            "Evaluated raw data"
        );
        (report, duplicate_report, duplicate_metadata)
    };
    summary.pre_issues = pre_report.len();
    summary.duplicate_groups = duplicate_report.len();

    let (curated, curated_spending) = {
        let _stage = info_span!("clean").entered();
        let curated = clean_applications(&applications, settings);
        let curated_spending = clean_spending_items(&spending);
        (curated, curated_spending)
    };

    let post_report = {
        let _stage = info_span!("validate", stage = "post").entered();
        let application_flags = validator.postclean(&curated);
        let spending_flags = validate_spending_postclean(&curated_spending);
        let report = build_data_quality_report(
            &curated,
            &application_flags,
            &duplicate_report,
            &duplicate_metadata,
            &curated_spending,
            &spending_flags,
            Stage::Post,
            &catalog,
        )?;
        info!(issues = report.len(), "Evaluated cleaned data");
        report
    };
    summary.post_issues = post_report.len();

    let canonical_count = duplicate_metadata
        .iter()
        .filter(|meta| meta.is_canonical_for_analysis)
        .count();
    summary.canonical_rows = canonical_count;

    let comparison = build_before_after_comparison(
        &pre_report,
        &post_report,
        &duplicate_report,
        &duplicate_metadata,
        applications.len(),
        canonical_count,
    );
    let cleaning_actions = summarise_cleaning_changes(&curated);

    let analysis = {
        let _stage = info_span!("privacy").entered();
        build_analysis_dataset(&curated, &duplicate_metadata, settings)
    };
    summary.analysis_rows = analysis.len();
    let pii_inventory = generate_pii_inventory();

    let (fairness_summary, gender_table, age_table, interaction, age_di, rejection_reasons) = {
        let _stage = info_span!("fairness").entered();
        let gender_di = disparate_impact(
            &analysis,
            |row| row.clean_gender.as_deref(),
            "Male",
            "Female",
            settings.four_fifths_threshold,
        );
        let age_di = age_di_table(&analysis, settings.four_fifths_threshold);
        let interest_rate_gap = interest_rate_by_gender(&analysis);
        let fairness_summary =
            build_fairness_summary(&gender_di, &age_di, interest_rate_gap.as_ref());
        info!(
            four_fifths_flag = gender_di.four_fifths_flag,
            age_comparisons = age_di.len(),
            "Computed fairness diagnostics"
        );
        (
            fairness_summary,
            gender_approval_table(&analysis),
            age_approval_table(&analysis),
            interaction_table(&analysis),
            age_di,
            rejection_reason_by_gender(&analysis),
        )
    };

    // Combined registry: pre rows first, then post.
    let mut quality_report = pre_report;
    quality_report.extend(post_report);

    {
        let _stage = info_span!("export").entered();
        write_artifact(&mut summary, "rule_catalog", output_dir, RULE_CATALOG_FILE, &catalog)?;
        write_artifact(
            &mut summary,
            "data_quality_report",
            output_dir,
            DATA_QUALITY_REPORT_FILE,
            &quality_report,
        )?;
        write_artifact(
            &mut summary,
            "duplicate_id_report",
            output_dir,
            DUPLICATE_ID_REPORT_FILE,
            &duplicate_report,
        )?;
        write_artifact(
            &mut summary,
            "duplicate_id_metadata",
            output_dir,
            DUPLICATE_ID_METADATA_FILE,
            &duplicate_metadata,
        )?;
        write_artifact(
            &mut summary,
            "cleaning_actions",
            output_dir,
            CLEANING_ACTIONS_FILE,
            &cleaning_actions,
        )?;
        write_artifact(
            &mut summary,
            "before_after_comparison",
            output_dir,
            BEFORE_AFTER_COMPARISON_FILE,
            &comparison,
        )?;
        write_artifact(
            &mut summary,
            "curated_applications",
            output_dir,
            CURATED_APPLICATIONS_FILE,
            &curated,
        )?;
        write_artifact(
            &mut summary,
            "curated_spending",
            output_dir,
            CURATED_SPENDING_FILE,
            &curated_spending,
        )?;
        write_artifact(
            &mut summary,
            "analysis_dataset",
            output_dir,
            ANALYSIS_DATASET_JSONL_FILE,
            &analysis,
        )?;
        let parquet_path = output_dir.join(ANALYSIS_DATASET_PARQUET_FILE);
        let parquet_rows = write_analysis_parquet(&analysis, &parquet_path)?;
        summary.record("analysis_dataset_parquet", &parquet_path, parquet_rows);
        write_artifact(
            &mut summary,
            "pii_inventory",
            output_dir,
            PII_INVENTORY_FILE,
            &pii_inventory,
        )?;
        write_artifact(
            &mut summary,
            "fairness_summary",
            output_dir,
            FAIRNESS_SUMMARY_FILE,
            &fairness_summary,
        )?;
        write_artifact(
            &mut summary,
            "fairness_gender_approval",
            output_dir,
            FAIRNESS_GENDER_APPROVAL_FILE,
            &gender_table,
        )?;
        write_artifact(
            &mut summary,
            "fairness_age_approval",
            output_dir,
            FAIRNESS_AGE_APPROVAL_FILE,
            &age_table,
        )?;
        write_artifact(
            &mut summary,
            "fairness_interaction",
            output_dir,
            FAIRNESS_INTERACTION_FILE,
            &interaction,
        )?;
        write_artifact(
            &mut summary,
            "fairness_age_di",
            output_dir,
            FAIRNESS_AGE_DI_FILE,
            &age_di,
        )?;
        write_artifact(
            &mut summary,
            "fairness_rejection_reasons",
            output_dir,
            FAIRNESS_REJECTION_REASONS_FILE,
            &rejection_reasons,
        )?;
    }

    let summary_path = output_dir.join(RUN_SUMMARY_FILE);
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    info!(
        records = summary.records,
        canonical_rows = summary.canonical_rows,
        artifacts = summary.artifacts.len(),
        "Run complete"
    );
    Ok(summary)
}

/// Write the rule catalog alone, for the `catalog` subcommand.
pub fn export_rule_catalog(path: &Path) -> Result<usize, ExportError> {
    write_jsonl(&build_rule_catalog(), path)
}

fn write_artifact<T: Serialize>(
    summary: &mut RunSummary,
    name: &str,
    output_dir: &Path,
    file_name: &str,
    rows: &[T],
) -> Result<(), PipelineError> {
    let path = output_dir.join(file_name);
    let written = write_jsonl(rows, &path)?;
    summary.record(name, &path, written);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use tempfile::TempDir;

    fn raw_export() -> &'static str {
        r#"[
            {
                "_id": "APP-1001",
                "processing_timestamp": "2024-03-01T10:00:00Z",
                "applicant_info": {
                    "full_name": "jane roe",
                    "email": "Jane.Roe@Example.com",
                    "ssn": "123-45-6789",
                    "ip_address": "8.8.8.8",
                    "gender": "F",
                    "date_of_birth": "1990-05-13",
                    "zip_code": "60601"
                },
                "financials": {
                    "annual_income": "52000",
                    "credit_history_months": 48,
                    "debt_to_income": 0.3,
                    "savings_balance": 1200
                },
                "decision": {
                    "loan_approved": true,
                    "interest_rate": 0.08,
                    "approved_amount": 15000
                },
                "spending_behavior": [
                    {"category": "online shopping", "amount": 120.5},
                    {"category": "", "amount": "-3"}
                ]
            },
            {
                "_id": "APP-1001",
                "processing_timestamp": "2024-03-02T09:00:00Z",
                "applicant_info": {
                    "full_name": "jane roe",
                    "email": "Jane.Roe@Example.com",
                    "ssn": "123-45-6789",
                    "ip_address": "8.8.8.8",
                    "gender": "F",
                    "date_of_birth": "1990-05-13",
                    "zip_code": "60601"
                },
                "financials": {
                    "annual_income": "52000",
                    "credit_history_months": 48,
                    "debt_to_income": 0.3,
                    "savings_balance": 1200
                },
                "decision": {
                    "loan_approved": true,
                    "interest_rate": 0.08,
                    "approved_amount": 15000
                }
            },
            {
                "_id": "APP-1002",
                "processing_timestamp": "2024-03-01T11:00:00Z",
                "applicant_info": {
                    "full_name": "John Doe",
                    "email": "bad-email",
                    "ssn": "987-65-4321",
                    "ip_address": "192.168.0.9",
                    "gender": "male",
                    "date_of_birth": "05/06/1985",
                    "zip_code": "94110"
                },
                "financials": {
                    "annual_salary": 61000,
                    "credit_history_months": -3,
                    "debt_to_income": 1.4,
                    "savings_balance": -50
                },
                "decision": {
                    "loan_approved": false
                }
            }
        ]"#
    }

    fn run_fixture(dir: &TempDir) -> RunSummary {
        let input = dir.path().join("raw_credit_applications.json");
        std::fs::write(&input, raw_export()).unwrap();
        let output_dir = dir.path().join("out");
        let settings = PipelineSettings::default();
        run_pipeline(&input, &output_dir, &settings).unwrap()
    }

    #[test]
    fn test_run_counts_every_stage() {
        let dir = TempDir::new().unwrap();
        let summary = run_fixture(&dir);

        assert_eq!(summary.records, 3);
        assert_eq!(summary.spending_items, 2);
        assert_eq!(summary.duplicate_groups, 1);
        // One canonical row per distinct id.
        assert_eq!(summary.canonical_rows, 2);
        assert_eq!(summary.analysis_rows, 2);
        assert!(summary.pre_issues > 0);
    }

    #[test]
    fn test_run_writes_every_artifact() {
        let dir = TempDir::new().unwrap();
        let summary = run_fixture(&dir);

        let expected = [
            "rule_catalog",
            "data_quality_report",
            "duplicate_id_report",
            "duplicate_id_metadata",
            "cleaning_actions",
            "before_after_comparison",
            "curated_applications",
            "curated_spending",
            "analysis_dataset",
            "analysis_dataset_parquet",
            "pii_inventory",
            "fairness_summary",
            "fairness_gender_approval",
            "fairness_age_approval",
            "fairness_interaction",
            "fairness_age_di",
            "fairness_rejection_reasons",
        ];
        assert_eq!(summary.artifacts.len(), expected.len());
        for name in expected {
            let artifact = summary.artifact(name).unwrap_or_else(|| panic!("missing {name}"));
            assert!(
                Path::new(&artifact.path).exists(),
                "artifact file absent: {}",
                artifact.path
            );
        }

        assert_eq!(summary.artifact("rule_catalog").unwrap().rows, 54);
        assert_eq!(summary.artifact("curated_applications").unwrap().rows, 3);
        assert_eq!(summary.artifact("analysis_dataset").unwrap().rows, 2);
        assert_eq!(summary.artifact("analysis_dataset_parquet").unwrap().rows, 2);
        assert_eq!(summary.artifact("cleaning_actions").unwrap().rows, 6);
        assert_eq!(summary.artifact("before_after_comparison").unwrap().rows, 18);
        assert_eq!(summary.artifact("pii_inventory").unwrap().rows, 10);
        assert!(dir.path().join("out").join(RUN_SUMMARY_FILE).exists());
    }

    #[test]
    fn test_run_rejects_non_array_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("raw.json");
        std::fs::write(&input, r#"{"records": []}"#).unwrap();

        let settings = PipelineSettings::default();
        let error = run_pipeline(&input, &dir.path().join("out"), &settings).unwrap_err();
        assert!(matches!(
            error,
            PipelineError::Ingest(IngestError::NotAnArray { .. })
        ));
    }

    #[test]
    fn test_export_rule_catalog_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("rule_catalog.jsonl");
        let rows = export_rule_catalog(&path).unwrap();
        assert_eq!(rows, 54);

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 54);
        assert!(text.lines().next().unwrap().contains("\"rule_id\""));
    }
}
