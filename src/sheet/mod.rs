//! Spreadsheet access for req-notifier
//!
//! This module provides:
//! - The `TabularStore` trait the workflow reads and writes sheets through
//! - `CsvStore`, a workbook directory holding one `<sheet>.csv` per sheet
//! - `Dataset` / `Row`, a header-indexed snapshot of one sheet
//!
//! # Example
//!
//! ```ignore
//! use req_notifier::sheet::{CsvStore, Dataset, TabularStore};
//!
//! let store = CsvStore::new("~/procurement");
//! let dataset = Dataset::from_matrix(store.read_all("Requests")?)?;
//!
//! for row in dataset.rows() {
//!     println!("{}: {:?}", row.sheet_row(), row.get("Action"));
//! }
//! ```

mod csv_store;
mod dataset;
#[cfg(test)]
pub mod memory;
mod store;

pub use csv_store::CsvStore;
pub use dataset::{Dataset, DatasetError, Row};
pub use store::{StoreError, TabularStore};
