//! Core trait and error type for sheet storage

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a tabular store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named sheet does not exist
    #[error("sheet '{sheet}' not found at {}", .path.display())]
    SheetNotFound { sheet: String, path: PathBuf },

    /// The sheet exists but could not be parsed or serialized
    #[error("sheet '{sheet}' is not valid CSV: {source}")]
    Csv {
        sheet: String,
        #[source]
        source: csv::Error,
    },

    /// Filesystem failure while reading or replacing a sheet
    #[error("I/O error on sheet '{sheet}': {source}")]
    Io {
        sheet: String,
        #[source]
        source: std::io::Error,
    },

    /// A column write addressed rows past the end of the sheet
    #[error("rows {start}..{end} out of range for sheet '{sheet}' ({rows} rows)")]
    OutOfRange {
        sheet: String,
        start: usize,
        end: usize,
        rows: usize,
    },
}

impl StoreError {
    pub fn csv(sheet: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            sheet: sheet.into(),
            source,
        }
    }

    pub fn io(sheet: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            sheet: sheet.into(),
            source,
        }
    }
}

/// Trait for spreadsheet-like storage
///
/// Rows and columns are 0-based and absolute: row 0 is the header row of a
/// data sheet, so the first data row lives at `row_offset = 1`.
pub trait TabularStore: Send + Sync {
    /// Read the full rectangular range of a sheet
    ///
    /// Ragged rows are padded with empty cells up to the widest row.
    fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError>;

    /// Read `row_count` cells of one column starting at `row_offset`
    ///
    /// Cells past the end of a short row read as empty.
    fn read_column(
        &self,
        sheet: &str,
        column: usize,
        row_offset: usize,
        row_count: usize,
    ) -> Result<Vec<String>, StoreError> {
        let matrix = self.read_all(sheet)?;
        let end = row_offset + row_count;
        if end > matrix.len() {
            return Err(StoreError::OutOfRange {
                sheet: sheet.to_string(),
                start: row_offset,
                end,
                rows: matrix.len(),
            });
        }

        Ok(matrix[row_offset..end]
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or_default())
            .collect())
    }

    /// Overwrite one column starting at `row_offset` with `values`
    ///
    /// Every cell outside the written range is preserved.
    fn write_column(
        &self,
        sheet: &str,
        column: usize,
        row_offset: usize,
        values: &[String],
    ) -> Result<(), StoreError>;
}

/// Pad ragged rows so the matrix is rectangular
pub(crate) fn rectangularize(mut matrix: Vec<Vec<String>>) -> Vec<Vec<String>> {
    let width = matrix.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut matrix {
        row.resize(width, String::new());
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::memory::MemoryStore;

    #[test]
    fn test_rectangularize_pads_short_rows() {
        let matrix = vec![
            vec!["a".to_string(), "b".to_string(), "c".to_string()],
            vec!["1".to_string()],
        ];
        let rect = rectangularize(matrix);
        assert_eq!(rect[1], vec!["1", "", ""]);
    }

    #[test]
    fn test_default_read_column() {
        let store = MemoryStore::new();
        store.insert(
            "Requests",
            vec![
                vec!["Action", "Log"],
                vec!["Assigned", "done"],
                vec!["Assigned", ""],
            ],
        );

        let column = store.read_column("Requests", 1, 1, 2).unwrap();
        assert_eq!(column, vec!["done", ""]);
    }

    #[test]
    fn test_read_column_out_of_range() {
        let store = MemoryStore::new();
        store.insert("Requests", vec![vec!["Action"], vec!["Assigned"]]);

        let err = store.read_column("Requests", 0, 1, 5).unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { rows: 2, .. }));
    }
}
