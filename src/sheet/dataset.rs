//! Header-indexed snapshot of a data sheet

use thiserror::Error;

/// Errors building a dataset from raw sheet values
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("sheet has no header row")]
    MissingHeader,
}

/// One sheet split into a header row and data rows
///
/// Every data row is normalized to the header width on load: short rows are
/// padded with empty cells, cells beyond the last header are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    /// Build a dataset from a full sheet range, first row being the headers
    pub fn from_matrix(matrix: Vec<Vec<String>>) -> Result<Self, DatasetError> {
        let mut iter = matrix.into_iter();
        let headers = iter.next().ok_or(DatasetError::MissingHeader)?;
        let width = headers.len();

        let rows: Vec<Vec<String>> = iter
            .map(|mut row| {
                if row.len() > width {
                    tracing::debug!(
                        extra = row.len() - width,
                        "Dropping cells beyond the last header"
                    );
                }
                row.resize(width, String::new());
                row
            })
            .collect();

        Ok(Self { headers, rows })
    }

    /// Column names in sheet order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of data rows (the header row is not counted)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a header, first match wins
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Values of one column across every data row
    pub fn column(&self, index: usize) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get(index).cloned().unwrap_or_default())
            .collect()
    }

    /// Data row at a 0-based index
    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        self.rows.get(index).map(|cells| Row {
            index,
            headers: &self.headers,
            cells,
        })
    }

    /// Iterate over data rows in sheet order
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.rows.len()).filter_map(|index| self.row(index))
    }
}

/// Borrowed view of one data row
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: usize,
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> Row<'a> {
    /// 0-based position among the data rows
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based row number as shown in a spreadsheet UI (header is row 1)
    pub fn sheet_row(&self) -> usize {
        self.index + 2
    }

    /// Value of a field by header name
    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.headers
            .iter()
            .position(|h| h == field)
            .and_then(|i| self.cells.get(i))
            .map(String::as_str)
    }

    /// Value of a field, empty when the header is absent
    pub fn value(&self, field: &str) -> &'a str {
        self.get(field).unwrap_or("")
    }

    /// Cell at a column position
    pub fn cell(&self, column: usize) -> &'a str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    /// `(header, value)` pairs in header order
    pub fn fields(&self) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        let cells = self.cells;
        self.headers
            .iter()
            .enumerate()
            .map(move |(i, h)| (h.as_str(), cells.get(i).map(String::as_str).unwrap_or("")))
    }
}
