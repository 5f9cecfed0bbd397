//! Flattening of nested export records into tabular rows.
//!
//! Applications flatten one-to-one; the `spending_behavior` list explodes
//! into its own table keyed by the parent's surrogate row id. Top-level
//! fields the schema does not know about are carried along as `raw_<field>`
//! passthrough columns so schema drift upstream never loses data.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::{Map, Value};

use crate::records::{scalar_to_text, ApplicationRow, RawRecord, SpendingRow};

/// Top-level export fields with dedicated handling. Everything else becomes
/// a passthrough column.
const KNOWN_TOP_LEVEL_FIELDS: [&str; 6] = [
    "_id",
    "processing_timestamp",
    "applicant_info",
    "financials",
    "decision",
    "spending_behavior",
];

/// Flatten each record into one application row.
///
/// Row ids are assigned in export order starting at zero. The passthrough
/// column set is the union over the whole batch, so every row carries every
/// passthrough column (null where the record lacked the field).
pub fn flatten_applications(records: &[RawRecord]) -> Vec<ApplicationRow> {
    let passthrough = passthrough_fields(records);

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let applicant = section(record, "applicant_info");
            let financials = section(record, "financials");
            let decision = section(record, "decision");

            let mut extra = BTreeMap::new();
            for field in &passthrough {
                extra.insert(format!("raw_{field}"), top_text(record, field));
            }

            ApplicationRow {
                application_row_id: index as u64,
                application_id: top_text(record, "_id"),
                raw_processing_timestamp: top_text(record, "processing_timestamp"),
                raw_applicant_full_name: section_text(applicant, "full_name"),
                raw_applicant_email: section_text(applicant, "email"),
                raw_applicant_ssn: section_text(applicant, "ssn"),
                raw_applicant_ip_address: section_text(applicant, "ip_address"),
                raw_applicant_gender: section_text(applicant, "gender"),
                raw_applicant_date_of_birth: section_text(applicant, "date_of_birth"),
                raw_applicant_zip_code: section_text(applicant, "zip_code"),
                raw_financial_annual_income: section_text(financials, "annual_income"),
                raw_financial_annual_salary: section_text(financials, "annual_salary"),
                raw_financial_credit_history_months: section_text(
                    financials,
                    "credit_history_months",
                ),
                raw_financial_debt_to_income: section_text(financials, "debt_to_income"),
                raw_financial_savings_balance: section_text(financials, "savings_balance"),
                raw_decision_loan_approved: section_text(decision, "loan_approved"),
                raw_decision_interest_rate: section_text(decision, "interest_rate"),
                raw_decision_approved_amount: section_text(decision, "approved_amount"),
                raw_decision_rejection_reason: section_text(decision, "rejection_reason"),
                extra,
            }
        })
        .collect()
}

/// Explode every `spending_behavior` list into one row per entry.
///
/// Records where `spending_behavior` is absent or not a list contribute no
/// rows. Non-object entries still produce a row with null category and
/// amount, keeping list positions accountable.
pub fn flatten_spending_items(records: &[RawRecord]) -> Vec<SpendingRow> {
    let mut rows = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let Some(items) = record.get("spending_behavior").and_then(Value::as_array) else {
            continue;
        };
        let application_id = top_text(record, "_id");

        for (spending_index, item) in items.iter().enumerate() {
            let entry = item.as_object();
            rows.push(SpendingRow {
                application_row_id: index as u64,
                application_id: application_id.clone(),
                spending_index,
                raw_category: entry
                    .and_then(|map| map.get("category"))
                    .and_then(scalar_to_text),
                raw_amount: entry
                    .and_then(|map| map.get("amount"))
                    .and_then(scalar_to_text),
            });
        }
    }

    rows
}

/// Sorted union of unrecognised top-level field names across the batch.
fn passthrough_fields(records: &[RawRecord]) -> Vec<String> {
    let mut fields = BTreeSet::new();
    for record in records {
        for key in record.keys() {
            if !KNOWN_TOP_LEVEL_FIELDS.contains(&key.as_str()) {
                fields.insert(key.clone());
            }
        }
    }
    fields.into_iter().collect()
}

fn section<'r>(record: &'r RawRecord, name: &str) -> Option<&'r Map<String, Value>> {
    record.get(name).and_then(Value::as_object)
}

fn section_text(section: Option<&Map<String, Value>>, field: &str) -> Option<String> {
    section.and_then(|map| map.get(field)).and_then(scalar_to_text)
}

fn top_text(record: &RawRecord, field: &str) -> Option<String> {
    record.get(field).and_then(scalar_to_text)
}
