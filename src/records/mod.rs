//! Row types flowing through the curation pipeline.
//!
//! A raw export deserialises into loosely-typed [`RawRecord`] maps, which
//! flatten into one [`ApplicationRow`] per application plus one
//! [`SpendingRow`] per spending entry. Cleaning wraps those in
//! [`CleanApplicationRow`] and [`CleanSpendingRow`], which keep every raw
//! column alongside the standardised values and remediation flags so that
//! curated artifacts stay auditable.

pub mod application;
pub mod curated;
pub mod raw;
pub mod spending;

pub use application::ApplicationRow;
pub use curated::{CleanApplicationRow, CleanSpendingRow};
pub use raw::{scalar_to_text, RawRecord};
pub use spending::SpendingRow;

/// Access to the business key shared by every tabular row type.
pub trait RecordKey {
    /// The applicant-facing identifier, when the source record carried one.
    fn application_id(&self) -> Option<&str>;
}

/// Access to the raw SSN column, which survives cleaning untouched.
pub trait SsnColumn {
    fn raw_ssn(&self) -> Option<&str>;
}
