//! End-of-run accounting.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// One exported artifact: logical name, path on disk, rows written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub name: String,
    pub path: String,
    pub rows: usize,
}

/// Dataset sizes at each stage plus every artifact written, serialised as
/// `run_summary.json` at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub input_path: String,
    pub output_dir: String,
    pub records: usize,
    pub spending_items: usize,
    pub duplicate_groups: usize,
    pub canonical_rows: usize,
    pub analysis_rows: usize,
    pub pre_issues: usize,
    pub post_issues: usize,
    pub artifacts: Vec<ArtifactRecord>,
}

impl RunSummary {
    pub(crate) fn new(input: &Path, output_dir: &Path) -> Self {
        Self {
            input_path: input.display().to_string(),
            output_dir: output_dir.display().to_string(),
            records: 0,
            spending_items: 0,
            duplicate_groups: 0,
            canonical_rows: 0,
            analysis_rows: 0,
            pre_issues: 0,
            post_issues: 0,
            artifacts: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, name: &str, path: &Path, rows: usize) {
        self.artifacts.push(ArtifactRecord {
            name: name.to_string(),
            path: path.display().to_string(),
            rows,
        });
    }

    /// Look up an artifact by logical name.
    pub fn artifact(&self, name: &str) -> Option<&ArtifactRecord> {
        self.artifacts.iter().find(|artifact| artifact.name == name)
    }
}
