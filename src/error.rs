//! Error types for credforge operations.
//!
//! Defines error types for the major subsystems:
//! - Raw export loading and flattening
//! - Quality report assembly
//! - Artifact export (JSONL, Parquet)
//! - End-to-end pipeline runs

use thiserror::Error;

/// Errors that can occur while loading and flattening a raw export.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Expected a top-level JSON array in '{path}', found {found}")]
    NotAnArray { path: String, found: String },

    #[error("Record at index {index} is not a JSON object (found {found})")]
    RecordNotObject { index: usize, found: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while assembling quality reports.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{report} contains rule_id values missing from rule catalog: {details}")]
    MissingCatalogRules { report: String, details: String },
}

/// Errors that can occur while writing artifacts to disk.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

/// Errors that can occur during a full pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Ingest failed: {0}")]
    Ingest(#[from] IngestError),

    #[error("Report assembly failed: {0}")]
    Report(#[from] ReportError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
