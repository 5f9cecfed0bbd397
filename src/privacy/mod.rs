//! Pseudonymisation and PII governance.
//!
//! Turns the curated table into an analysis dataset that carries no direct
//! identifiers: deterministic salted pseudonyms stand in for identity,
//! dates of birth collapse to age bands, and the PII inventory records
//! which sensitive fields surface where.

pub mod analysis;
pub mod inventory;
pub mod masking;
pub mod pseudonym;

pub use analysis::{age_band_for, build_analysis_dataset, AnalysisRow, AGE_BANDS};
pub use inventory::{generate_pii_inventory, PiiClass, PiiInventoryRow};
pub use pseudonym::{assign_applicant_pseudo_id, stable_hash, PseudoIdSource};
