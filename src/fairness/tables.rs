//! Subgroup approval tables and disparity breakdowns.
//!
//! All tables are descriptive aggregates over the analysis dataset with
//! explicit sort keys: gender tables alphabetical, age tables in band
//! order, the rejection table by descending total.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::privacy::{AnalysisRow, AGE_BANDS};

use super::metrics::{disparate_impact, DisparateImpact};

/// Reference band age disparities are measured against.
pub const PRIME_AGE_REFERENCE: &str = "25-34";

/// Gender labels the subgroup analyses compare. Rows with any other or a
/// missing label are excluded rather than bucketed.
const BINARY_GENDERS: [&str; 2] = ["Male", "Female"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenderApprovalRow {
    pub gender: String,
    pub n: usize,
    pub approved_n: usize,
    pub approval_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgeApprovalRow {
    pub age_band: String,
    pub n: usize,
    pub approved_n: usize,
    pub approval_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRow {
    pub age_band: String,
    pub gender: String,
    pub n: usize,
    pub approved_n: usize,
    pub approval_rate: f64,
}

/// Interest-rate spread between approved male and female applicants.
/// Counts cover rows with a recorded rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestRateGap {
    pub male_n: usize,
    pub female_n: usize,
    pub male_median_rate: Option<f64>,
    pub female_median_rate: Option<f64>,
    pub male_mean_rate: Option<f64>,
    pub female_mean_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectionReasonRow {
    pub rejection_reason: String,
    pub female_n: usize,
    pub male_n: usize,
    pub total: usize,
}

/// Rows with a binary gender label and a recorded outcome.
fn gender_subset(rows: &[AnalysisRow]) -> Vec<&AnalysisRow> {
    rows.iter()
        .filter(|row| {
            row.clean_gender
                .as_deref()
                .map_or(false, |gender| BINARY_GENDERS.contains(&gender))
                && row.clean_loan_approved.is_some()
        })
        .collect()
}

/// Rows with an age band and a recorded outcome.
fn age_subset(rows: &[AnalysisRow]) -> Vec<&AnalysisRow> {
    rows.iter()
        .filter(|row| row.age_band.is_some() && row.clean_loan_approved.is_some())
        .collect()
}

/// Approval counts and rate by gender, alphabetical.
pub fn gender_approval_table(rows: &[AnalysisRow]) -> Vec<GenderApprovalRow> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in gender_subset(rows) {
        let (Some(gender), Some(outcome)) = (row.clean_gender.as_deref(), row.clean_loan_approved)
        else {
            continue;
        };
        let entry = groups.entry(gender).or_default();
        entry.0 += 1;
        if outcome {
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|(gender, (n, approved_n))| GenderApprovalRow {
            gender: gender.to_string(),
            n,
            approved_n,
            approval_rate: approved_n as f64 / n as f64,
        })
        .collect()
}

/// Approval counts and rate by age band, in band order. Absent bands are
/// omitted rather than reported at zero.
pub fn age_approval_table(rows: &[AnalysisRow]) -> Vec<AgeApprovalRow> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in age_subset(rows) {
        let (Some(band), Some(outcome)) = (row.age_band.as_deref(), row.clean_loan_approved)
        else {
            continue;
        };
        let entry = groups.entry(band).or_default();
        entry.0 += 1;
        if outcome {
            entry.1 += 1;
        }
    }
    AGE_BANDS
        .iter()
        .filter_map(|band| {
            groups.get(band).map(|&(n, approved_n)| AgeApprovalRow {
                age_band: (*band).to_string(),
                n,
                approved_n,
                approval_rate: approved_n as f64 / n as f64,
            })
        })
        .collect()
}

/// Approval rate by age band and gender, ordered by band then gender.
pub fn interaction_table(rows: &[AnalysisRow]) -> Vec<InteractionRow> {
    let mut groups: BTreeMap<(usize, &str), (usize, usize)> = BTreeMap::new();
    for row in rows {
        let Some(gender) = row.clean_gender.as_deref() else {
            continue;
        };
        if !BINARY_GENDERS.contains(&gender) {
            continue;
        }
        let Some(band) = row.age_band.as_deref() else {
            continue;
        };
        let Some(outcome) = row.clean_loan_approved else {
            continue;
        };
        let Some(order) = AGE_BANDS.iter().position(|known| *known == band) else {
            continue;
        };
        let entry = groups.entry((order, gender)).or_default();
        entry.0 += 1;
        if outcome {
            entry.1 += 1;
        }
    }
    groups
        .into_iter()
        .map(|((order, gender), (n, approved_n))| InteractionRow {
            age_band: AGE_BANDS[order].to_string(),
            gender: gender.to_string(),
            n,
            approved_n,
            approval_rate: approved_n as f64 / n as f64,
        })
        .collect()
}

/// Disparate impact of every observed age band against the reference band.
pub fn age_di_table(rows: &[AnalysisRow], threshold: f64) -> Vec<DisparateImpact> {
    let subset = age_subset(rows);
    let present: BTreeSet<&str> = subset
        .iter()
        .filter_map(|row| row.age_band.as_deref())
        .collect();
    AGE_BANDS
        .iter()
        .filter(|band| **band != PRIME_AGE_REFERENCE && present.contains(**band))
        .map(|band| {
            disparate_impact(
                subset.iter().copied(),
                |row| row.age_band.as_deref(),
                PRIME_AGE_REFERENCE,
                band,
                threshold,
            )
        })
        .collect()
}

/// Interest-rate medians and means for approved applicants by gender.
/// Absent when no approved row carries a binary gender label.
pub fn interest_rate_by_gender(rows: &[AnalysisRow]) -> Option<InterestRateGap> {
    let approved: Vec<&AnalysisRow> = gender_subset(rows)
        .into_iter()
        .filter(|row| row.clean_loan_approved == Some(true))
        .collect();
    if approved.is_empty() {
        return None;
    }

    let rates_for = |gender: &str| -> Vec<f64> {
        approved
            .iter()
            .filter(|row| row.clean_gender.as_deref() == Some(gender))
            .filter_map(|row| row.clean_interest_rate)
            .collect()
    };
    let mut male_rates = rates_for("Male");
    let mut female_rates = rates_for("Female");

    Some(InterestRateGap {
        male_n: male_rates.len(),
        female_n: female_rates.len(),
        male_median_rate: median(&mut male_rates).map(round6),
        female_median_rate: median(&mut female_rates).map(round6),
        male_mean_rate: mean(&male_rates).map(round6),
        female_mean_rate: mean(&female_rates).map(round6),
    })
}

/// Rejection reasons split by gender, heaviest reasons first.
pub fn rejection_reason_by_gender(rows: &[AnalysisRow]) -> Vec<RejectionReasonRow> {
    let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for row in gender_subset(rows) {
        if row.clean_loan_approved != Some(false) {
            continue;
        }
        let Some(reason) = row.clean_rejection_reason.as_deref() else {
            continue;
        };
        let entry = groups.entry(reason).or_default();
        match row.clean_gender.as_deref() {
            Some("Female") => entry.0 += 1,
            Some("Male") => entry.1 += 1,
            _ => {}
        }
    }

    let mut table: Vec<RejectionReasonRow> = groups
        .into_iter()
        .map(|(reason, (female_n, male_n))| RejectionReasonRow {
            rejection_reason: reason.to_string(),
            female_n,
            male_n,
            total: female_n + male_n,
        })
        .collect();
    table.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.rejection_reason.cmp(&b.rejection_reason))
    });
    table
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}
