//! Standardisation of raw rows into typed, audited clean columns.

pub mod applications;
pub mod spending;

pub use applications::clean_applications;
pub use spending::clean_spending_items;

/// Trim, optionally lowercase, and turn blank text into a missing value.
pub(crate) fn normalise_text(value: Option<&str>, lower: bool) -> Option<String> {
    let trimmed = value.unwrap_or("").trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(if lower {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    })
}

/// Capitalise the first letter of every alphabetic run, lowercasing the
/// rest, with any non-alphabetic character starting a new word.
pub(crate) fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_alphabetic = false;
    for character in text.chars() {
        if character.is_alphabetic() {
            if previous_alphabetic {
                out.extend(character.to_lowercase());
            } else {
                out.extend(character.to_uppercase());
            }
            previous_alphabetic = true;
        } else {
            out.push(character);
            previous_alphabetic = false;
        }
    }
    out
}
