//! Pipeline orchestration for curation runs.
//!
//! # Pipeline flow
//!
//! 1. **Ingest**: the raw export loads as a strict JSON array and flattens
//!    into application and spending tables
//! 2. **Pre-clean evaluation**: every rule runs over the raw columns and
//!    the duplicate resolver classifies repeated `application_id`s
//! 3. **Cleaning**: deterministic standardisation with audit flags
//! 4. **Post-clean evaluation**: the same rules re-run over clean columns
//! 5. **Remediation accounting**: before/after comparison and the
//!    cleaning-action summary
//! 6. **Privacy**: pseudonymised, canonical-only analysis dataset plus the
//!    PII inventory
//! 7. **Fairness**: descriptive approval-rate diagnostics over the
//!    analysis dataset
//! 8. **Export**: every table as JSONL, the analysis dataset additionally
//!    as Parquet, and a run summary

pub mod run;
pub mod summary;

pub use run::{export_rule_catalog, run_pipeline};
pub use summary::{ArtifactRecord, RunSummary};
