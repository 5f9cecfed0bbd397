//! The PII-free analysis dataset: one row per canonical application.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::dedup::RowDuplicateMetadata;
use crate::records::CleanApplicationRow;
use crate::settings::PipelineSettings;

use super::pseudonym::{assign_applicant_pseudo_id, PseudoIdSource};

/// Coarse age bands, in ascending order.
pub const AGE_BANDS: [&str; 6] = ["<25", "25-34", "35-44", "45-54", "55-64", "65+"];

/// One analysis-ready application.
///
/// Deliberately narrow: direct identifiers are replaced by the pseudonym,
/// the date of birth by its age band, and the audit/remediation columns of
/// the curated table are left behind entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRow {
    pub application_id: Option<String>,
    pub applicant_pseudo_id: String,
    pub pseudo_id_source: PseudoIdSource,
    pub pseudo_id_fallback_used_flag: bool,
    pub age_band: Option<String>,
    pub age_band_missing_flag: bool,
    pub clean_gender: Option<String>,
    pub clean_zip_code: Option<String>,
    pub clean_annual_income: Option<f64>,
    pub clean_credit_history_months: Option<i64>,
    pub clean_debt_to_income: Option<f64>,
    pub clean_savings_balance: Option<f64>,
    pub clean_loan_approved: Option<bool>,
    pub clean_interest_rate: Option<f64>,
    pub clean_approved_amount: Option<f64>,
    pub clean_rejection_reason: Option<String>,
}

/// Band an age computed against the reference date.
///
/// Bands are left-closed; a date of birth after the reference date yields
/// no band rather than a negative age.
pub fn age_band_for(date_of_birth: Option<NaiveDate>, reference: NaiveDate) -> Option<&'static str> {
    let dob = date_of_birth?;
    let age_years = (reference - dob).num_days() as f64 / 365.25;
    if age_years < 0.0 {
        return None;
    }
    let band = match age_years {
        a if a < 25.0 => AGE_BANDS[0],
        a if a < 35.0 => AGE_BANDS[1],
        a if a < 45.0 => AGE_BANDS[2],
        a if a < 55.0 => AGE_BANDS[3],
        a if a < 65.0 => AGE_BANDS[4],
        _ => AGE_BANDS[5],
    };
    Some(band)
}

/// Project the canonical curated rows into analysis rows.
///
/// Rows are ordered by `(application_id, application_row_id)` with missing
/// ids last, then deduplicated by `application_id` keeping the first row.
/// The dedup is a guard on top of the resolver's one-canonical-per-group
/// contract.
pub fn build_analysis_dataset(
    curated: &[CleanApplicationRow],
    duplicate_metadata: &[RowDuplicateMetadata],
    settings: &PipelineSettings,
) -> Vec<AnalysisRow> {
    let canonical_row_ids: BTreeSet<u64> = duplicate_metadata
        .iter()
        .filter(|meta| meta.is_canonical_for_analysis)
        .map(|meta| meta.application_row_id)
        .collect();

    let mut canonical: Vec<&CleanApplicationRow> = curated
        .iter()
        .filter(|row| canonical_row_ids.contains(&row.source.application_row_id))
        .collect();
    canonical.sort_by(|a, b| {
        compare_ids_missing_last(
            a.source.application_id.as_deref(),
            b.source.application_id.as_deref(),
        )
        .then(a.source.application_row_id.cmp(&b.source.application_row_id))
    });

    let mut seen_ids: BTreeSet<Option<&str>> = BTreeSet::new();
    let mut analysis = Vec::with_capacity(canonical.len());
    for row in canonical {
        if !seen_ids.insert(row.source.application_id.as_deref()) {
            continue;
        }
        analysis.push(analysis_row(row, settings));
    }

    info!(rows = analysis.len(), "Built analysis dataset");
    analysis
}

fn analysis_row(row: &CleanApplicationRow, settings: &PipelineSettings) -> AnalysisRow {
    let (pseudo_id, source) = assign_applicant_pseudo_id(&row.source, &settings.hash_salt);
    let age_band = age_band_for(row.clean_date_of_birth, settings.analysis_reference_date);

    AnalysisRow {
        application_id: row.source.application_id.clone(),
        applicant_pseudo_id: pseudo_id,
        pseudo_id_source: source,
        pseudo_id_fallback_used_flag: source.is_fallback(),
        age_band: age_band.map(str::to_string),
        age_band_missing_flag: age_band.is_none(),
        clean_gender: row.clean_gender.clone(),
        clean_zip_code: row.clean_zip_code.clone(),
        clean_annual_income: row.clean_annual_income,
        clean_credit_history_months: row.clean_credit_history_months,
        clean_debt_to_income: row.clean_debt_to_income,
        clean_savings_balance: row.clean_savings_balance,
        clean_loan_approved: row.clean_loan_approved,
        clean_interest_rate: row.clean_interest_rate,
        clean_approved_amount: row.clean_approved_amount,
        clean_rejection_reason: row.clean_rejection_reason.clone(),
    }
}

fn compare_ids_missing_last(a: Option<&str>, b: Option<&str>) -> std::cmp::Ordering {
    match (a, b) {
        (Some(left), Some(right)) => left.cmp(right),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    }
}
