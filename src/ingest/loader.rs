//! Strict loader for the raw credit-application export.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::IngestError;
use crate::records::RawRecord;

/// Load a raw export file.
///
/// The file must hold a single top-level JSON array and every element must
/// be an object; anything else is rejected up front rather than surfacing
/// as misshapen rows later in the run. An empty array is valid.
pub fn load_raw_records(path: &Path) -> Result<Vec<RawRecord>, IngestError> {
    let text = fs::read_to_string(path)?;
    let payload: Value = serde_json::from_str(&text)?;

    let Value::Array(items) = payload else {
        return Err(IngestError::NotAnArray {
            path: path.display().to_string(),
            found: json_type_name(&payload).to_string(),
        });
    };

    let records = items
        .into_iter()
        .enumerate()
        .map(|(index, item)| match item {
            Value::Object(map) => Ok(map),
            other => Err(IngestError::RecordNotObject {
                index,
                found: json_type_name(&other).to_string(),
            }),
        })
        .collect::<Result<Vec<RawRecord>, IngestError>>()?;

    debug!(path = %path.display(), records = records.len(), "Loaded raw export");
    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
