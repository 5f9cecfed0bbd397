//! Issue registries, remediation summaries and before/after comparisons.

pub mod cleaning;
pub mod comparison;
pub mod quality;

pub use cleaning::{summarise_cleaning_changes, CleaningActionRow};
pub use comparison::{build_before_after_comparison, ComparisonRow};
pub use quality::{build_data_quality_report, check_catalog_coverage, IssueRow};

/// Report percentages carry two decimal places.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
