//! Artifact export.
//!
//! Every pipeline artifact is written as JSONL; the analysis dataset is
//! additionally exported as ZSTD-compressed Parquet.

pub mod jsonl;
pub mod parquet;

pub use jsonl::write_jsonl;
pub use parquet::{analysis_schema, analysis_to_record_batch, write_analysis_parquet};
