//! Masking helpers for log lines and previews.
//!
//! Blank input passes through unchanged so masked previews keep the shape
//! of the underlying data.

use crate::records::ApplicationRow;

/// `***-**-<last4>`, keeping only the SSN tail.
pub fn mask_ssn(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return value.to_string();
    }
    let chars: Vec<char> = trimmed.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("***-**-{tail}")
}

/// First character of the local part plus the full domain.
pub fn mask_email(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return value.to_string();
    }
    match trimmed.split_once('@') {
        Some((local, domain)) => {
            let prefix: String = local.chars().take(1).collect();
            format!("{prefix}***@{domain}")
        }
        None => "[REDACTED_EMAIL]".to_string(),
    }
}

/// Fixed token; even a partial address can identify a network.
pub fn mask_ip(value: &str) -> String {
    if value.trim().is_empty() {
        value.to_string()
    } else {
        "[REDACTED_IP]".to_string()
    }
}

/// Year prefix only (`<year>-**-**`).
pub fn mask_dob(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return value.to_string();
    }
    let chars: Vec<char> = trimmed.chars().collect();
    let year: String = if chars.len() >= 4 {
        chars[..4].iter().collect()
    } else {
        "XXXX".to_string()
    };
    format!("{year}-**-**")
}

/// Fixed token.
pub fn mask_name(value: &str) -> String {
    if value.trim().is_empty() {
        value.to_string()
    } else {
        "[REDACTED_NAME]".to_string()
    }
}

/// One-line redacted rendering of a raw row, safe for debug logs.
pub fn masked_row_preview(row: &ApplicationRow) -> String {
    let masked = |value: Option<&str>, mask: fn(&str) -> String| {
        value.map(mask).unwrap_or_else(|| "-".to_string())
    };
    format!(
        "id={} name={} email={} ssn={} ip={} dob={}",
        row.application_id.as_deref().unwrap_or("-"),
        masked(row.raw_applicant_full_name.as_deref(), mask_name),
        masked(row.raw_applicant_email.as_deref(), mask_email),
        masked(row.raw_applicant_ssn.as_deref(), mask_ssn),
        masked(row.raw_applicant_ip_address.as_deref(), mask_ip),
        masked(row.raw_applicant_date_of_birth.as_deref(), mask_dob),
    )
}
