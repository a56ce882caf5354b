//! Table shape check

use crate::core::model::{Category, Finding};
use crate::markdown::block::Table;

/// Warn about body rows whose cell count differs from the header row
pub fn check_table(table: &Table, path: &str) -> Vec<Finding> {
    let Some(header) = table.rows.first() else {
        return Vec::new();
    };

    table
        .rows
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, row)| row.len() != header.len())
        .map(|(index, row)| {
            Finding::warning(
                Category::InconsistentTable,
                path,
                table.row_line(index),
                format!(
                    "table row has {} cells but the header has {}",
                    row.len(),
                    header.len()
                ),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rows: &[&[&str]]) -> Table {
        Table {
            rows: rows
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
            start_line: 3,
        }
    }

    #[test]
    fn test_consistent_table() {
        let t = table(&[&["a", "b"], &["1", "2"]]);
        assert!(check_table(&t, "a.md").is_empty());
    }

    #[test]
    fn test_ragged_row() {
        let t = table(&[&["a", "b"], &["1", "2"], &["1", "2", "3"]]);
        let findings = check_table(&t, "a.md");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].category, Category::InconsistentTable);
        assert_eq!(findings[0].line, 6);
    }
}
