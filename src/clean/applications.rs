//! Deterministic application cleaning.
//!
//! Every transform either standardises a value or nullifies an impossible
//! one, and every destructive decision leaves an audit flag on the row so
//! the post-clean evaluator and the cleaning summary can account for it.

use chrono::NaiveDate;
use tracing::debug;

use crate::records::{ApplicationRow, CleanApplicationRow};
use crate::settings::PipelineSettings;
use crate::validate::scalars::{
    is_blank, parse_bool, parse_number, parse_utc_timestamp, slash_date_parts,
};

use super::normalise_text;

/// Parse one date-of-birth value.
///
/// ISO and `YYYY/MM/DD` shapes parse directly. `NN/NN/YYYY` resolves
/// month-first; when both segments could be a month the date still parses
/// but is marked ambiguous. Returns `(date, ambiguous, parse_failed)`.
pub(crate) fn parse_dob_value(value: Option<&str>) -> (Option<NaiveDate>, bool, bool) {
    let Some(raw) = value else {
        return (None, false, false);
    };
    let text = raw.trim();
    if text.is_empty() {
        return (None, false, false);
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return (Some(date), false, false);
        }
    }

    if let Some((left, right, year)) = slash_date_parts(text) {
        let ambiguous = left <= 12 && right <= 12;
        let (month, day) = if left > 12 { (right, left) } else { (left, right) };
        return match NaiveDate::from_ymd_opt(year, month, day) {
            Some(date) => (Some(date), ambiguous, false),
            None => (None, false, true),
        };
    }

    (None, false, true)
}

/// Clean every application row, ordered by row id.
pub fn clean_applications(
    rows: &[ApplicationRow],
    settings: &PipelineSettings,
) -> Vec<CleanApplicationRow> {
    let mut ordered: Vec<&ApplicationRow> = rows.iter().collect();
    ordered.sort_by_key(|row| row.application_row_id);

    let cleaned: Vec<CleanApplicationRow> = ordered
        .into_iter()
        .map(|row| clean_application_row(row, settings))
        .collect();
    debug!(rows = cleaned.len(), "Cleaned application rows");
    cleaned
}

fn clean_application_row(row: &ApplicationRow, settings: &PipelineSettings) -> CleanApplicationRow {
    let clean_email = normalise_text(row.raw_applicant_email.as_deref(), true);

    let gender_key = row
        .raw_applicant_gender
        .as_deref()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    let clean_gender = settings.gender_map.get(&gender_key).cloned();
    let gender_standardized_flag = matches!(gender_key.as_str(), "m" | "f");

    let (clean_date_of_birth, dob_ambiguous_flag, dob_parse_failed_flag) =
        parse_dob_value(row.raw_applicant_date_of_birth.as_deref());

    let clean_processing_timestamp = row
        .raw_processing_timestamp
        .as_deref()
        .and_then(parse_utc_timestamp)
        .map(|instant| instant.format("%Y-%m-%dT%H:%M:%SZ").to_string());

    let clean_zip_code = normalise_text(row.raw_applicant_zip_code.as_deref(), false);

    let income = row.raw_financial_annual_income.as_deref();
    let salary = row.raw_financial_annual_salary.as_deref();
    let income_missing = is_blank(income);
    let annual_income_from_salary_flag = income_missing && !is_blank(salary);
    let clean_annual_income = parse_number(if income_missing { salary } else { income });

    let credit_history = parse_number(row.raw_financial_credit_history_months.as_deref());
    let credit_history_nullified_flag = credit_history.map_or(false, |months| months < 0.0);
    let clean_credit_history_months = if credit_history_nullified_flag {
        None
    } else {
        credit_history.map(|months| months.round() as i64)
    };

    let dti = parse_number(row.raw_financial_debt_to_income.as_deref());
    let dti_nullified_flag = dti.map_or(false, |ratio| !(0.0..=1.0).contains(&ratio));
    let clean_debt_to_income = if dti_nullified_flag { None } else { dti };

    let savings = parse_number(row.raw_financial_savings_balance.as_deref());
    let savings_nullified_flag = savings.map_or(false, |balance| balance < 0.0);
    let clean_savings_balance = if savings_nullified_flag { None } else { savings };

    let clean_loan_approved = parse_bool(row.raw_decision_loan_approved.as_deref());
    let clean_interest_rate = parse_number(row.raw_decision_interest_rate.as_deref());
    let clean_approved_amount = parse_number(row.raw_decision_approved_amount.as_deref());
    let clean_rejection_reason = normalise_text(row.raw_decision_rejection_reason.as_deref(), false);

    let approved_missing_terms_flag = clean_loan_approved == Some(true)
        && (clean_interest_rate.is_none() || clean_approved_amount.is_none());
    let rejected_missing_reason_flag =
        clean_loan_approved == Some(false) && clean_rejection_reason.is_none();

    CleanApplicationRow {
        source: row.clone(),
        clean_email,
        clean_gender,
        gender_standardized_flag,
        clean_date_of_birth,
        dob_ambiguous_flag,
        dob_parse_failed_flag,
        clean_processing_timestamp,
        clean_zip_code,
        annual_income_from_salary_flag,
        clean_annual_income,
        credit_history_nullified_flag,
        clean_credit_history_months,
        dti_nullified_flag,
        clean_debt_to_income,
        savings_nullified_flag,
        clean_savings_balance,
        clean_loan_approved,
        clean_interest_rate,
        clean_approved_amount,
        clean_rejection_reason,
        approved_missing_terms_flag,
        rejected_missing_reason_flag,
    }
}
