//! Curated rows: raw columns plus standardised values and remediation flags.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ApplicationRow, RecordKey, SpendingRow, SsnColumn};

/// A cleaned application row.
///
/// Every raw column of the source row is retained; cleaning only ever adds
/// `clean_*` columns and boolean remediation flags. Flags default to
/// `false`, so "nothing happened" and "no flag column" read the same way.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanApplicationRow {
    #[serde(flatten)]
    pub source: ApplicationRow,
    pub clean_email: Option<String>,
    pub clean_gender: Option<String>,
    pub gender_standardized_flag: bool,
    pub clean_date_of_birth: Option<NaiveDate>,
    pub dob_ambiguous_flag: bool,
    pub dob_parse_failed_flag: bool,
    /// Rendered as `%Y-%m-%dT%H:%M:%SZ` when the raw timestamp parsed.
    pub clean_processing_timestamp: Option<String>,
    pub clean_zip_code: Option<String>,
    pub annual_income_from_salary_flag: bool,
    pub clean_annual_income: Option<f64>,
    pub credit_history_nullified_flag: bool,
    pub clean_credit_history_months: Option<i64>,
    pub dti_nullified_flag: bool,
    pub clean_debt_to_income: Option<f64>,
    pub savings_nullified_flag: bool,
    pub clean_savings_balance: Option<f64>,
    pub clean_loan_approved: Option<bool>,
    pub clean_interest_rate: Option<f64>,
    pub clean_approved_amount: Option<f64>,
    pub clean_rejection_reason: Option<String>,
    pub approved_missing_terms_flag: bool,
    pub rejected_missing_reason_flag: bool,
}

impl RecordKey for CleanApplicationRow {
    fn application_id(&self) -> Option<&str> {
        self.source.application_id.as_deref()
    }
}

impl SsnColumn for CleanApplicationRow {
    fn raw_ssn(&self) -> Option<&str> {
        self.source.raw_applicant_ssn.as_deref()
    }
}

/// A cleaned spending row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleanSpendingRow {
    #[serde(flatten)]
    pub source: SpendingRow,
    /// Title-cased category, absent when the raw category was blank.
    pub category_clean: Option<String>,
    pub category_missing_flag: bool,
    pub amount_invalid_flag: bool,
    pub amount_negative_flag: bool,
    /// Parsed amount with negatives withheld; invalid text stays absent.
    pub amount_clean: Option<f64>,
}

impl RecordKey for CleanSpendingRow {
    fn application_id(&self) -> Option<&str> {
        self.source.application_id.as_deref()
    }
}
