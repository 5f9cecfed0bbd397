//! credforge: curation pipeline for raw credit-application exports.
//!
//! This library flattens a nested raw export into tabular rows, evaluates a
//! stage-aware data-quality rule set before and after deterministic
//! cleaning, resolves duplicate application ids, derives a pseudonymised
//! analysis dataset, and computes descriptive fairness diagnostics over it.

// Core modules
pub mod clean;
pub mod cli;
pub mod dedup;
pub mod error;
pub mod export;
pub mod fairness;
pub mod ingest;
pub mod pipeline;
pub mod privacy;
pub mod records;
pub mod report;
pub mod rules;
pub mod settings;
pub mod validate;

// Re-export commonly used error types
pub use error::{ExportError, IngestError, PipelineError, ReportError};
pub use pipeline::{run_pipeline, RunSummary};
pub use settings::{PipelineSettings, SettingsError};
