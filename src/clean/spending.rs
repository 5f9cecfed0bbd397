//! Spending-item cleaning.

use tracing::debug;

use crate::records::{CleanSpendingRow, SpendingRow};
use crate::validate::scalars::{is_blank, parse_number};

use super::title_case;

/// Clean every spending item, ordered by `(application_row_id, spending_index)`.
pub fn clean_spending_items(rows: &[SpendingRow]) -> Vec<CleanSpendingRow> {
    let mut ordered: Vec<&SpendingRow> = rows.iter().collect();
    ordered.sort_by_key(|row| (row.application_row_id, row.spending_index));

    let cleaned: Vec<CleanSpendingRow> = ordered.into_iter().map(clean_spending_row).collect();
    debug!(rows = cleaned.len(), "Cleaned spending items");
    cleaned
}

fn clean_spending_row(row: &SpendingRow) -> CleanSpendingRow {
    let trimmed = row.raw_category.as_deref().unwrap_or("").trim();
    let category_missing_flag = trimmed.is_empty();
    let category_clean = (!category_missing_flag).then(|| title_case(trimmed));

    let amount_blank = is_blank(row.raw_amount.as_deref());
    let amount = parse_number(row.raw_amount.as_deref());
    let amount_invalid_flag = !amount_blank && amount.is_none();
    let amount_negative_flag = amount.map_or(false, |value| value < 0.0);
    let amount_clean = if amount_negative_flag { None } else { amount };

    CleanSpendingRow {
        source: row.clone(),
        category_clean,
        category_missing_flag,
        amount_invalid_flag,
        amount_negative_flag,
        amount_clean,
    }
}
