//! Remediation summary: how often each cleaning action fired.

use serde::{Deserialize, Serialize};

use crate::records::CleanApplicationRow;

use super::round2;

/// Aggregate of one cleaning action over the curated table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningActionRow {
    pub action_id: String,
    pub description: String,
    pub count: usize,
    pub percent: f64,
}

const ACTIONS: [(&str, &str, fn(&CleanApplicationRow) -> bool); 6] = [
    (
        "A_CLEAN_001",
        "annual_salary mapped into clean_annual_income",
        |row| row.annual_income_from_salary_flag,
    ),
    (
        "A_CLEAN_002",
        "Negative credit_history_months nullified",
        |row| row.credit_history_nullified_flag,
    ),
    (
        "A_CLEAN_003",
        "Out-of-range debt_to_income nullified",
        |row| row.dti_nullified_flag,
    ),
    (
        "A_CLEAN_004",
        "Negative savings_balance nullified",
        |row| row.savings_nullified_flag,
    ),
    (
        "A_CLEAN_005",
        "DOB parse failed and set to null",
        |row| row.dob_parse_failed_flag,
    ),
    (
        "A_CLEAN_006",
        "DOB parsed using ambiguity fallback rule",
        |row| row.dob_ambiguous_flag,
    ),
];

/// Count each remediation flag over the curated rows, in action-id order.
/// Zero-count actions are still reported so the table has a fixed shape.
pub fn summarise_cleaning_changes(rows: &[CleanApplicationRow]) -> Vec<CleaningActionRow> {
    let denominator = rows.len();
    ACTIONS
        .iter()
        .map(|(action_id, description, flag)| {
            let count = rows.iter().filter(|row| flag(row)).count();
            let percent = if denominator == 0 {
                0.0
            } else {
                round2(count as f64 / denominator as f64 * 100.0)
            };
            CleaningActionRow {
                action_id: (*action_id).to_string(),
                description: (*description).to_string(),
                count,
                percent,
            }
        })
        .collect()
}
