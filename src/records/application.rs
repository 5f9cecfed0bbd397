//! Flattened application rows and their column-level access helpers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{RecordKey, SsnColumn};

/// Raw columns every flattened application row carries by name, in flatten
/// order. Unrecognised top-level export fields ride in
/// [`ApplicationRow::extra`] instead.
pub const NAMED_RAW_COLUMNS: [&str; 17] = [
    "raw_processing_timestamp",
    "raw_applicant_full_name",
    "raw_applicant_email",
    "raw_applicant_ssn",
    "raw_applicant_ip_address",
    "raw_applicant_gender",
    "raw_applicant_date_of_birth",
    "raw_applicant_zip_code",
    "raw_financial_annual_income",
    "raw_financial_annual_salary",
    "raw_financial_credit_history_months",
    "raw_financial_debt_to_income",
    "raw_financial_savings_balance",
    "raw_decision_loan_approved",
    "raw_decision_interest_rate",
    "raw_decision_approved_amount",
    "raw_decision_rejection_reason",
];

/// One flattened application.
///
/// All raw values are kept as text exactly as rendered from the export;
/// typing happens later in the cleaner. `application_row_id` is a per-run
/// surrogate key assigned in export order and is the only column excluded
/// from duplicate comparisons.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApplicationRow {
    pub application_row_id: u64,
    pub application_id: Option<String>,
    pub raw_processing_timestamp: Option<String>,
    pub raw_applicant_full_name: Option<String>,
    pub raw_applicant_email: Option<String>,
    pub raw_applicant_ssn: Option<String>,
    pub raw_applicant_ip_address: Option<String>,
    pub raw_applicant_gender: Option<String>,
    pub raw_applicant_date_of_birth: Option<String>,
    pub raw_applicant_zip_code: Option<String>,
    pub raw_financial_annual_income: Option<String>,
    pub raw_financial_annual_salary: Option<String>,
    pub raw_financial_credit_history_months: Option<String>,
    pub raw_financial_debt_to_income: Option<String>,
    pub raw_financial_savings_balance: Option<String>,
    pub raw_decision_loan_approved: Option<String>,
    pub raw_decision_interest_rate: Option<String>,
    pub raw_decision_approved_amount: Option<String>,
    pub raw_decision_rejection_reason: Option<String>,
    /// Passthrough columns (`raw_<field>`) for unrecognised top-level keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Option<String>>,
}

impl ApplicationRow {
    /// Whether `column` is one of the named raw columns (vs a passthrough).
    pub fn is_named_raw_column(column: &str) -> bool {
        NAMED_RAW_COLUMNS.contains(&column)
    }

    /// Look up a raw column by name.
    ///
    /// Returns `None` for columns this row does not carry at all and
    /// `Some(None)` for a carried-but-null value, so callers can tell an
    /// unknown column apart from a missing value.
    pub fn raw_value(&self, column: &str) -> Option<Option<&str>> {
        let value = match column {
            "raw_processing_timestamp" => &self.raw_processing_timestamp,
            "raw_applicant_full_name" => &self.raw_applicant_full_name,
            "raw_applicant_email" => &self.raw_applicant_email,
            "raw_applicant_ssn" => &self.raw_applicant_ssn,
            "raw_applicant_ip_address" => &self.raw_applicant_ip_address,
            "raw_applicant_gender" => &self.raw_applicant_gender,
            "raw_applicant_date_of_birth" => &self.raw_applicant_date_of_birth,
            "raw_applicant_zip_code" => &self.raw_applicant_zip_code,
            "raw_financial_annual_income" => &self.raw_financial_annual_income,
            "raw_financial_annual_salary" => &self.raw_financial_annual_salary,
            "raw_financial_credit_history_months" => &self.raw_financial_credit_history_months,
            "raw_financial_debt_to_income" => &self.raw_financial_debt_to_income,
            "raw_financial_savings_balance" => &self.raw_financial_savings_balance,
            "raw_decision_loan_approved" => &self.raw_decision_loan_approved,
            "raw_decision_interest_rate" => &self.raw_decision_interest_rate,
            "raw_decision_approved_amount" => &self.raw_decision_approved_amount,
            "raw_decision_rejection_reason" => &self.raw_decision_rejection_reason,
            _ => return self.extra.get(column).map(Option::as_deref),
        };
        Some(value.as_deref())
    }

    /// Columns compared when classifying duplicate groups, as
    /// `(column, value)` pairs.
    ///
    /// The surrogate row id is excluded; the business key, every named raw
    /// column and every passthrough column participate.
    pub fn comparable_columns(&self) -> Vec<(&str, Option<&str>)> {
        let mut columns = Vec::with_capacity(1 + NAMED_RAW_COLUMNS.len() + self.extra.len());
        columns.push(("application_id", self.application_id.as_deref()));
        for name in NAMED_RAW_COLUMNS {
            columns.push((name, self.raw_value(name).flatten()));
        }
        for (name, value) in &self.extra {
            columns.push((name.as_str(), value.as_deref()));
        }
        columns
    }
}

impl RecordKey for ApplicationRow {
    fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }
}

impl SsnColumn for ApplicationRow {
    fn raw_ssn(&self) -> Option<&str> {
        self.raw_applicant_ssn.as_deref()
    }
}
