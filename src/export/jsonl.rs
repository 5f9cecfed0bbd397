//! Line-delimited JSON artifact writer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::ExportError;

/// Write one JSON object per line, creating parent directories as needed.
/// Returns the number of rows written; an empty slice yields an empty file.
pub fn write_jsonl<T: Serialize>(rows: &[T], path: &Path) -> Result<usize, ExportError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for row in rows {
        let line = serde_json::to_string(row)?;
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;

    debug!(path = %path.display(), rows = rows.len(), "JSONL artifact written");
    Ok(rows.len())
}
