//! Flattened spending entries, one row per list element.

use serde::{Deserialize, Serialize};

use super::RecordKey;

/// One spending entry from an application's `spending_behavior` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingRow {
    /// Surrogate key of the parent application row.
    pub application_row_id: u64,
    pub application_id: Option<String>,
    /// Zero-based position of this entry within its application's list.
    pub spending_index: usize,
    pub raw_category: Option<String>,
    pub raw_amount: Option<String>,
}

impl RecordKey for SpendingRow {
    fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }
}
