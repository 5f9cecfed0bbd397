//! PII inventory across the raw, curated and analysis surfaces.

use serde::{Deserialize, Serialize};

/// Sensitivity class of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PiiClass {
    #[serde(rename = "PII")]
    Pii,
    #[serde(rename = "Quasi-PII")]
    QuasiPii,
    #[serde(rename = "Non-PII")]
    NonPii,
}

/// Inventory entry tracking where one sensitive field surfaces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PiiInventoryRow {
    pub field_path: String,
    pub classification: PiiClass,
    pub present_in_raw: bool,
    pub present_in_curated: bool,
    pub present_in_analysis: bool,
}

/// The audited inventory, sorted by field path.
///
/// The presence columns follow directly from the row models: the curated
/// table retains every raw column, while the analysis table keeps only the
/// pseudonym, the age band and the quasi-identifiers needed for fairness
/// slicing.
pub fn generate_pii_inventory() -> Vec<PiiInventoryRow> {
    let entries: [(&str, PiiClass, bool, bool, bool); 10] = [
        ("age_band", PiiClass::NonPii, false, false, true),
        ("applicant_info.date_of_birth", PiiClass::Pii, true, true, false),
        ("applicant_info.email", PiiClass::Pii, true, true, false),
        ("applicant_info.full_name", PiiClass::Pii, true, true, false),
        ("applicant_info.gender", PiiClass::QuasiPii, true, true, true),
        ("applicant_info.ip_address", PiiClass::Pii, true, true, false),
        ("applicant_info.ssn", PiiClass::Pii, true, true, false),
        ("applicant_info.zip_code", PiiClass::QuasiPii, true, true, true),
        ("applicant_pseudo_id", PiiClass::QuasiPii, false, false, true),
        ("application_id", PiiClass::QuasiPii, true, true, true),
    ];

    entries
        .into_iter()
        .map(
            |(field_path, classification, raw, curated, analysis)| PiiInventoryRow {
                field_path: field_path.to_string(),
                classification,
                present_in_raw: raw,
                present_in_curated: curated,
                present_in_analysis: analysis,
            },
        )
        .collect()
}
