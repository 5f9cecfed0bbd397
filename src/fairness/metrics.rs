//! Core fairness metrics over the analysis dataset.

use serde::{Deserialize, Serialize};

use crate::privacy::AnalysisRow;

/// Disparate-impact comparison between two groups.
///
/// Rates are missing rather than zero when a group has no usable outcome,
/// and the ratio is missing whenever the privileged rate cannot anchor it.
/// `four_fifths_flag` only raises on a computed ratio below the threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisparateImpact {
    pub privileged_group: String,
    pub unprivileged_group: String,
    pub privileged_n: usize,
    pub unprivileged_n: usize,
    pub privileged_rate: Option<f64>,
    pub unprivileged_rate: Option<f64>,
    pub disparate_impact: Option<f64>,
    pub demographic_parity_difference: Option<f64>,
    pub four_fifths_flag: bool,
}

/// Share of approved outcomes, ignoring rows with no recorded outcome.
pub fn approval_rate<'a, I>(rows: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a AnalysisRow>,
{
    let mut approved = 0usize;
    let mut total = 0usize;
    for row in rows {
        if let Some(outcome) = row.clean_loan_approved {
            total += 1;
            if outcome {
                approved += 1;
            }
        }
    }
    (total > 0).then(|| approved as f64 / total as f64)
}

/// Compare approval rates between an unprivileged and a privileged group.
///
/// DI = unprivileged rate / privileged rate; DPD = unprivileged −
/// privileged. Group sizes count every row carrying the group label.
pub fn disparate_impact<'a, I, F>(
    rows: I,
    group_of: F,
    privileged: &str,
    unprivileged: &str,
    threshold: f64,
) -> DisparateImpact
where
    I: IntoIterator<Item = &'a AnalysisRow>,
    F: Fn(&AnalysisRow) -> Option<&str>,
{
    let mut privileged_rows: Vec<&AnalysisRow> = Vec::new();
    let mut unprivileged_rows: Vec<&AnalysisRow> = Vec::new();
    for row in rows {
        match group_of(row) {
            Some(label) if label == privileged => privileged_rows.push(row),
            Some(label) if label == unprivileged => unprivileged_rows.push(row),
            _ => {}
        }
    }

    let privileged_rate = approval_rate(privileged_rows.iter().copied());
    let unprivileged_rate = approval_rate(unprivileged_rows.iter().copied());
    let di = match (privileged_rate, unprivileged_rate) {
        (Some(priv_rate), Some(unpriv_rate)) if priv_rate > 0.0 => Some(unpriv_rate / priv_rate),
        _ => None,
    };
    let dpd = match (privileged_rate, unprivileged_rate) {
        (Some(priv_rate), Some(unpriv_rate)) => Some(unpriv_rate - priv_rate),
        _ => None,
    };

    DisparateImpact {
        privileged_group: privileged.to_string(),
        unprivileged_group: unprivileged.to_string(),
        privileged_n: privileged_rows.len(),
        unprivileged_n: unprivileged_rows.len(),
        privileged_rate,
        unprivileged_rate,
        disparate_impact: di,
        demographic_parity_difference: dpd,
        four_fifths_flag: di.map_or(false, |ratio| ratio < threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::PseudoIdSource;

    fn analysis_row(
        gender: Option<&str>,
        band: Option<&str>,
        approved: Option<bool>,
    ) -> AnalysisRow {
        AnalysisRow {
            application_id: Some("APP-1".to_string()),
            applicant_pseudo_id: "hash".to_string(),
            pseudo_id_source: PseudoIdSource::Ssn,
            pseudo_id_fallback_used_flag: false,
            age_band: band.map(str::to_string),
            age_band_missing_flag: band.is_none(),
            clean_gender: gender.map(str::to_string),
            clean_zip_code: None,
            clean_annual_income: None,
            clean_credit_history_months: None,
            clean_debt_to_income: None,
            clean_savings_balance: None,
            clean_loan_approved: approved,
            clean_interest_rate: None,
            clean_approved_amount: None,
            clean_rejection_reason: None,
        }
    }

    #[test]
    fn test_approval_rate_ignores_missing_outcomes() {
        let rows = vec![
            analysis_row(Some("Male"), None, Some(true)),
            analysis_row(Some("Male"), None, Some(false)),
            analysis_row(Some("Male"), None, None),
        ];
        assert_eq!(approval_rate(&rows), Some(0.5));
        assert_eq!(approval_rate(&[] as &[AnalysisRow]), None);
    }

    #[test]
    fn test_disparate_impact_below_threshold_flags() {
        let mut rows = Vec::new();
        for _ in 0..8 {
            rows.push(analysis_row(Some("Male"), None, Some(true)));
        }
        rows.push(analysis_row(Some("Male"), None, Some(false)));
        rows.push(analysis_row(Some("Male"), None, Some(false)));
        for _ in 0..3 {
            rows.push(analysis_row(Some("Female"), None, Some(true)));
        }
        for _ in 0..7 {
            rows.push(analysis_row(Some("Female"), None, Some(false)));
        }

        let result = disparate_impact(
            &rows,
            |row| row.clean_gender.as_deref(),
            "Male",
            "Female",
            0.80,
        );
        assert_eq!(result.privileged_n, 10);
        assert_eq!(result.unprivileged_n, 10);
        assert_eq!(result.privileged_rate, Some(0.8));
        assert_eq!(result.unprivileged_rate, Some(0.3));
        assert_eq!(result.disparate_impact, Some(0.375));
        assert_eq!(result.demographic_parity_difference, Some(-0.5));
        assert!(result.four_fifths_flag);
    }

    #[test]
    fn test_missing_privileged_group_yields_missing_ratio() {
        let rows = vec![analysis_row(Some("Female"), None, Some(true))];
        let result = disparate_impact(
            &rows,
            |row| row.clean_gender.as_deref(),
            "Male",
            "Female",
            0.80,
        );
        assert_eq!(result.privileged_n, 0);
        assert_eq!(result.disparate_impact, None);
        assert_eq!(result.demographic_parity_difference, None);
        assert!(!result.four_fifths_flag);
    }

    #[test]
    fn test_zero_privileged_rate_yields_missing_ratio() {
        let rows = vec![
            analysis_row(Some("Male"), None, Some(false)),
            analysis_row(Some("Female"), None, Some(true)),
        ];
        let result = disparate_impact(
            &rows,
            |row| row.clean_gender.as_deref(),
            "Male",
            "Female",
            0.80,
        );
        assert_eq!(result.privileged_rate, Some(0.0));
        assert_eq!(result.disparate_impact, None);
        assert_eq!(result.demographic_parity_difference, Some(1.0));
        assert!(!result.four_fifths_flag);
    }
}
