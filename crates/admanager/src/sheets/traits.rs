//! Spreadsheet trait definitions

use serde::{Deserialize, Serialize};

use super::SheetError;

/// A named grid of text cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, values: Vec<Vec<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Value at a 1-based cell position; empty cells read as ""
    pub fn cell(&self, row: usize, column: usize) -> &str {
        row.checked_sub(1)
            .zip(column.checked_sub(1))
            .and_then(|(r, c)| self.values.get(r)?.get(c))
            .map_or("", String::as_str)
    }

    /// Overwrite a rectangular block anchored at a 1-based cell, growing the grid as needed
    pub fn write_block(&mut self, row: usize, column: usize, values: &[Vec<String>]) {
        let (row0, col0) = (row.saturating_sub(1), column.saturating_sub(1));

        if self.values.len() < row0 + values.len() {
            self.values.resize_with(row0 + values.len(), Vec::new);
        }
        for (offset, source) in values.iter().enumerate() {
            let target = &mut self.values[row0 + offset];
            if target.len() < col0 + source.len() {
                target.resize(col0 + source.len(), String::new());
            }
            target[col0..col0 + source.len()].clone_from_slice(source);
        }
    }
}

/// Alias for a single cell, used for configuration lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedRange {
    pub sheet: String,
    /// 1-based row of the top-left cell
    pub row: usize,
    /// 1-based column of the top-left cell
    pub column: usize,
}

impl NamedRange {
    pub fn new(sheet: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            column,
        }
    }
}

/// Menu entry bound to a trigger name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub item_name: String,
    pub function_name: String,
}

impl MenuItem {
    pub fn new(item_name: impl Into<String>, function_name: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            function_name: function_name.into(),
        }
    }
}

/// A menu added to the spreadsheet UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    pub name: String,
    pub items: Vec<MenuItem>,
}

/// Trait for spreadsheet operations
///
/// Abstracts over different backends (in-memory, workbook file, ...).
/// Cell positions are 1-based like the spreadsheet UI.
pub trait Spreadsheet: Send + Sync {
    /// Create a sheet as a copy of a template and write `values` at A1
    ///
    /// Fails with [`SheetError::NameConflict`] when the name is taken and
    /// [`SheetError::TemplateNotFound`] when the template is missing. Nothing
    /// is created on failure.
    fn create_sheet_from_template(
        &self,
        new_sheet_name: &str,
        template_sheet_name: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetError>;

    /// Overwrite a rectangular block of an existing sheet
    fn write_values(
        &self,
        sheet_name: &str,
        row: usize,
        column: usize,
        values: &[Vec<String>],
    ) -> Result<(), SheetError>;

    /// Value of the top-left cell of a named range
    fn value_from_named_range(&self, range_name: &str) -> Result<String, SheetError>;

    /// Add a menu to the spreadsheet UI
    fn create_menu(&self, menu_name: &str, items: &[MenuItem]) -> Result<(), SheetError>;
}

/// Check that `values` is a non-empty rectangle
pub fn validate_values(values: &[Vec<String>]) -> Result<(), SheetError> {
    let width = values
        .first()
        .map(Vec::len)
        .ok_or_else(|| SheetError::InvalidValues("no rows to write".to_string()))?;
    if width == 0 {
        return Err(SheetError::InvalidValues("rows have no cells".to_string()));
    }
    if let Some((index, row)) = values.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(SheetError::InvalidValues(format!(
            "row {} has {} cells, expected {}",
            index + 1,
            row.len(),
            width
        )));
    }
    Ok(())
}
