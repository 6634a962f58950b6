//! In-memory store for tests

use super::store::{StoreError, TabularStore, rectangularize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

/// Sheets held in memory, with a count of column writes
#[derive(Default)]
pub struct MemoryStore {
    sheets: Mutex<HashMap<String, Vec<Vec<String>>>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, sheet: &str, rows: Vec<Vec<&str>>) {
        let rows = rows
            .into_iter()
            .map(|r| r.into_iter().map(String::from).collect())
            .collect();
        self.sheets.lock().unwrap().insert(sheet.to_string(), rows);
    }

    pub fn sheet(&self, sheet: &str) -> Vec<Vec<String>> {
        self.sheets.lock().unwrap().get(sheet).cloned().unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl TabularStore for MemoryStore {
    fn read_all(&self, sheet: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let sheets = self.sheets.lock().unwrap();
        let rows = sheets.get(sheet).ok_or_else(|| StoreError::SheetNotFound {
            sheet: sheet.to_string(),
            path: PathBuf::from(format!("memory://{}", sheet)),
        })?;
        Ok(rectangularize(rows.clone()))
    }

    fn write_column(
        &self,
        sheet: &str,
        column: usize,
        row_offset: usize,
        values: &[String],
    ) -> Result<(), StoreError> {
        let mut sheets = self.sheets.lock().unwrap();
        let rows = sheets
            .get_mut(sheet)
            .ok_or_else(|| StoreError::SheetNotFound {
                sheet: sheet.to_string(),
                path: PathBuf::from(format!("memory://{}", sheet)),
            })?;

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

        *self.writes.lock().unwrap() += 1;
        Ok(())
    }
}
