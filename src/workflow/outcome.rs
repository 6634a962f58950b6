//! Per-row outcomes and the run report

use crate::sheet::Row;
use serde::Serialize;

/// What happened to one candidate row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "error", rename_all = "lowercase")]
pub enum OutcomeKind {
    /// Operator confirmed and the message was handed to the transport
    Sent,
    /// Operator declined
    Skipped,
    /// Something failed; carries the error text
    Error(String),
}

/// Outcome for one processed row, with the log entry written for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowOutcome {
    /// 0-based data row index
    pub row_index: usize,
    /// Row number as shown in the spreadsheet
    pub sheet_row: usize,
    pub kind: OutcomeKind,
    /// Text for the log cell
    pub entry: String,
}

impl RowOutcome {
    pub fn sent(row: &Row<'_>, entry: String) -> Self {
        Self {
            row_index: row.index(),
            sheet_row: row.sheet_row(),
            kind: OutcomeKind::Sent,
            entry,
        }
    }

    pub fn skipped(row: &Row<'_>, entry: String) -> Self {
        Self {
            row_index: row.index(),
            sheet_row: row.sheet_row(),
            kind: OutcomeKind::Skipped,
            entry,
        }
    }

    pub fn error(row: &Row<'_>, message: String) -> Self {
        Self {
            row_index: row.index(),
            sheet_row: row.sheet_row(),
            entry: format!("Error: {}", message),
            kind: OutcomeKind::Error(message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.kind, OutcomeKind::Error(_))
    }
}

/// Updated values for a stage's log column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogColumnUpdate {
    pub name: String,
    /// Column position in the data sheet
    pub index: usize,
    /// One value per data row, untouched rows as loaded
    pub values: Vec<String>,
}

/// Result of one workflow run, before it is persisted
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub stage: String,
    pub action: String,
    /// Number of data rows in the sheet
    pub total_rows: usize,
    pub log_column: Option<LogColumnUpdate>,
    pub outcomes: Vec<RowOutcome>,
}

impl RunReport {
    pub fn sent(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::Sent))
    }

    pub fn skipped(&self) -> usize {
        self.count(|k| matches!(k, OutcomeKind::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_error()).count()
    }

    pub fn has_errors(&self) -> bool {
        self.failed() > 0
    }

    fn count(&self, pred: impl Fn(&OutcomeKind) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.kind)).count()
    }
}
