//! Dense boolean flag storage, one column per rule key.

use std::collections::BTreeMap;

/// Evaluation results for one table at one stage.
///
/// Every column has exactly `row_count` concrete booleans; there is no
/// null state. Columns are keyed by rule key, and reading a key that was
/// never set behaves as an all-false column, so report builders can probe
/// for rules without caring which evaluator ran.
#[derive(Debug, Clone)]
pub struct FlagMatrix<K: Copy + Ord> {
    row_count: usize,
    columns: BTreeMap<K, Vec<bool>>,
}

impl<K: Copy + Ord> FlagMatrix<K> {
    pub fn new(row_count: usize) -> Self {
        Self {
            row_count,
            columns: BTreeMap::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Install a column. `values` must have one entry per row.
    pub fn set_column(&mut self, key: K, values: Vec<bool>) {
        debug_assert_eq!(values.len(), self.row_count);
        self.columns.insert(key, values);
    }

    pub fn has_column(&self, key: K) -> bool {
        self.columns.contains_key(&key)
    }

    pub fn column(&self, key: K) -> Option<&[bool]> {
        self.columns.get(&key).map(Vec::as_slice)
    }

    /// Number of flagged rows in a column; zero for absent columns.
    pub fn count(&self, key: K) -> usize {
        self.columns
            .get(&key)
            .map_or(0, |column| column.iter().filter(|flag| **flag).count())
    }

    /// Indices of flagged rows, in row order.
    pub fn flagged_rows(&self, key: K) -> Vec<usize> {
        match self.columns.get(&key) {
            Some(column) => column
                .iter()
                .enumerate()
                .filter_map(|(index, flag)| flag.then_some(index))
                .collect(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_flagged_rows() {
        let mut matrix: FlagMatrix<u8> = FlagMatrix::new(4);
        matrix.set_column(1, vec![true, false, true, false]);

        assert_eq!(matrix.row_count(), 4);
        assert!(matrix.has_column(1));
        assert_eq!(matrix.count(1), 2);
        assert_eq!(matrix.flagged_rows(1), vec![0, 2]);
    }

    #[test]
    fn test_absent_column_reads_as_all_false() {
        let matrix: FlagMatrix<u8> = FlagMatrix::new(3);
        assert!(!matrix.has_column(9));
        assert_eq!(matrix.count(9), 0);
        assert!(matrix.flagged_rows(9).is_empty());
        assert_eq!(matrix.column(9), None);
    }
}
