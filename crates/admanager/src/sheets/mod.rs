//! Spreadsheet traits and implementations
//!
//! This module defines the spreadsheet abstraction the exporter writes to.
//! The trait-based design allows swapping between the in-memory store used
//! by tests and a workbook persisted on disk.

mod error;
mod memory;
mod traits;
mod workbook;
mod xlsx;

pub use error::SheetError;
pub use memory::InMemorySpreadsheet;
pub use traits::{Menu, MenuItem, NamedRange, Sheet, Spreadsheet, validate_values};
pub use workbook::{WorkbookDocument, WorkbookFile};
pub use xlsx::{export_xlsx, sanitize_sheet_name};
