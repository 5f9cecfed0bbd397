//! Deterministic applicant pseudonyms.
//!
//! Identity resolution walks a fixed strategy ladder over the raw identity
//! columns: SSN, then email, then name/DOB/zip, then the application id
//! itself. The chosen seed is salted and hashed, so the same applicant maps
//! to the same pseudonym across runs while the raw identifiers never leave
//! the curated table.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::records::ApplicationRow;

/// Which rung of the identity ladder produced a pseudonym.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PseudoIdSource {
    Ssn,
    EmailFallback,
    NameDobZipFallback,
    ApplicationIdFallback,
}

impl PseudoIdSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PseudoIdSource::Ssn => "ssn",
            PseudoIdSource::EmailFallback => "email_fallback",
            PseudoIdSource::NameDobZipFallback => "name_dob_zip_fallback",
            PseudoIdSource::ApplicationIdFallback => "application_id_fallback",
        }
    }

    /// True for every rung below the primary SSN strategy.
    pub fn is_fallback(self) -> bool {
        !matches!(self, PseudoIdSource::Ssn)
    }
}

/// Hex SHA-256 of `<salt>|<seed>`.
pub fn stable_hash(seed: &str, salt: &str) -> String {
    let digest = Sha256::digest(format!("{salt}|{seed}").as_bytes());
    hex::encode(digest)
}

/// Derive the pseudonym and the strategy that produced it for one row.
///
/// Blank identity fields skip to the next rung; the application-id rung
/// always succeeds because the surrogate row id is unique per run.
pub fn assign_applicant_pseudo_id(row: &ApplicationRow, salt: &str) -> (String, PseudoIdSource) {
    if let Some(ssn) = non_blank(row.raw_applicant_ssn.as_deref()) {
        let seed = format!("ssn:{}", ssn.trim());
        return (stable_hash(&seed, salt), PseudoIdSource::Ssn);
    }
    if let Some(email) = non_blank(row.raw_applicant_email.as_deref()) {
        let seed = format!("email:{}", email.trim().to_lowercase());
        return (stable_hash(&seed, salt), PseudoIdSource::EmailFallback);
    }

    let name = row.raw_applicant_full_name.as_deref().unwrap_or("");
    let dob = row.raw_applicant_date_of_birth.as_deref().unwrap_or("");
    let zip = row.raw_applicant_zip_code.as_deref().unwrap_or("");
    if [name, dob, zip].iter().any(|value| !value.trim().is_empty()) {
        let seed = format!(
            "name_dob_zip:{}|{}|{}",
            name.trim().to_lowercase(),
            dob.trim(),
            zip.trim()
        );
        return (stable_hash(&seed, salt), PseudoIdSource::NameDobZipFallback);
    }

    let seed = format!(
        "application:{}|row:{}",
        row.application_id.as_deref().unwrap_or(""),
        row.application_row_id
    );
    (stable_hash(&seed, salt), PseudoIdSource::ApplicationIdFallback)
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}
