//! Spending-item rule evaluation.

use crate::records::{CleanSpendingRow, SpendingRow};
use crate::rules::SpendingRuleKey;

use super::matrix::FlagMatrix;
use super::scalars::{is_blank, is_non_numeric_text, parse_number};

/// Evaluate the spending rules over raw exploded items.
pub fn validate_spending_preclean(rows: &[SpendingRow]) -> FlagMatrix<SpendingRuleKey> {
    let mut matrix = FlagMatrix::new(rows.len());

    matrix.set_column(
        SpendingRuleKey::MissingCategory,
        rows.iter()
            .map(|row| is_blank(row.raw_category.as_deref()))
            .collect(),
    );
    matrix.set_column(
        SpendingRuleKey::AmountNonNumeric,
        rows.iter()
            .map(|row| is_non_numeric_text(row.raw_amount.as_deref()))
            .collect(),
    );
    matrix.set_column(
        SpendingRuleKey::AmountNegative,
        rows.iter()
            .map(|row| {
                parse_number(row.raw_amount.as_deref()).map_or(false, |amount| amount < 0.0)
            })
            .collect(),
    );

    matrix
}

/// Evaluate the spending rules over cleaned items. Cleaning records its own
/// findings as flags, so the post pass just reads them back.
pub fn validate_spending_postclean(rows: &[CleanSpendingRow]) -> FlagMatrix<SpendingRuleKey> {
    let mut matrix = FlagMatrix::new(rows.len());

    matrix.set_column(
        SpendingRuleKey::MissingCategory,
        rows.iter().map(|row| row.category_missing_flag).collect(),
    );
    matrix.set_column(
        SpendingRuleKey::AmountNonNumeric,
        rows.iter().map(|row| row.amount_invalid_flag).collect(),
    );
    matrix.set_column(
        SpendingRuleKey::AmountNegative,
        rows.iter().map(|row| row.amount_negative_flag).collect(),
    );

    matrix
}
