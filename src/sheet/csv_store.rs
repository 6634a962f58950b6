//! CSV-backed workbook

use super::store::{StoreError, TabularStore, rectangularize};
use std::path::{Path, PathBuf};

/// A workbook stored as a directory of CSV files, one per sheet
///
/// Sheet `Requests` lives at `<dir>/Requests.csv`. Writes go to a sibling
/// temporary file that is renamed over the original, so a failed write
/// never leaves a half-written sheet behind.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
}

impl CsvStore {
    /// Create a store rooted at a workbook directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Workbook directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the CSV file backing a sheet
    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sheet))
    }

    /// Read raw records without padding
    fn read_records(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            return Err(StoreError::SheetNotFound {
                sheet: sheet.to_string(),
                path,
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| StoreError::csv(sheet, e))?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| StoreError::csv(sheet, e))?;
            rows.push(record.iter().map(String::from).collect());
        }

        tracing::debug!(sheet, rows = rows.len(), path = %path.display(), "Read sheet");
        Ok(rows)
    }

    /// Replace a sheet's contents
    fn write_records(&self, sheet: &str, rows: &[Vec<String>]) -> Result<(), StoreError> {
        let path = self.sheet_path(sheet);
        let tmp_path = self.dir.join(format!(".{}.csv.tmp", sheet));

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(&tmp_path)
                .map_err(|e| StoreError::csv(sheet, e))?;

            for row in rows {
                writer
                    .write_record(row)
                    .map_err(|e| StoreError::csv(sheet, e))?;
            }
            writer.flush().map_err(|e| StoreError::io(sheet, e))?;
        }

        std::fs::rename(&tmp_path, &path).map_err(|e| StoreError::io(sheet, e))?;

        tracing::debug!(sheet, rows = rows.len(), path = %path.display(), "Wrote sheet");
        Ok(())
    }
}

impl TabularStore for CsvStore {
    fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        self.read_records(sheet).map(rectangularize)
    }

    fn write_column(
        &self,
        sheet: &str,
        column: usize,
        row_offset: usize,
        values: &[String],
    ) -> Result<(), StoreError> {
        let mut rows = self.read_records(sheet)?;

        let end = row_offset + values.len();
        if end > rows.len() {
            return Err(StoreError::OutOfRange {
                sheet: sheet.to_string(),
                start: row_offset,
                end,
                rows: rows.len(),
            });
        }

        for (row, value) in rows[row_offset..end].iter_mut().zip(values) {
            if row.len() <= column {
                row.resize(column + 1, String::new());
            }
            row[column] = value.clone();
        }

        self.write_records(sheet, &rows)
    }
}
