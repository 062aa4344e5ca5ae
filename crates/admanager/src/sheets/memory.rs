//! In-memory spreadsheet implementation
//!
//! Used by tests and as the working model behind [`super::WorkbookFile`].

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{Menu, MenuItem, NamedRange, Sheet, SheetError, Spreadsheet, validate_values};

/// In-memory implementation of Spreadsheet
///
/// Sheets are kept in creation order. Sheet names are unique ignoring
/// case, matching how spreadsheet UIs treat them.
pub struct InMemorySpreadsheet {
    sheets: RwLock<Vec<Sheet>>,
    named_ranges: RwLock<BTreeMap<String, NamedRange>>,
    menus: RwLock<Vec<Menu>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, SheetError> {
    lock.read()
        .map_err(|_| SheetError::Storage(anyhow::anyhow!("spreadsheet lock poisoned")))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, SheetError> {
    lock.write()
        .map_err(|_| SheetError::Storage(anyhow::anyhow!("spreadsheet lock poisoned")))
}

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

impl InMemorySpreadsheet {
    /// Create a new empty spreadsheet
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), BTreeMap::new())
    }

    /// Create a spreadsheet from existing sheets and named ranges
    pub fn from_parts(sheets: Vec<Sheet>, named_ranges: BTreeMap<String, NamedRange>) -> Self {
        Self {
            sheets: RwLock::new(sheets),
            named_ranges: RwLock::new(named_ranges),
            menus: RwLock::new(Vec::new()),
        }
    }

    /// Add a sheet, replacing any sheet with the same name
    pub fn with_sheet(self, name: &str, values: Vec<Vec<String>>) -> Self {
        if let Ok(mut sheets) = self.sheets.write() {
            sheets.retain(|s| !same_name(&s.name, name));
            sheets.push(Sheet::new(name, values));
        }
        self
    }

    /// Define a named range pointing at one cell
    pub fn with_named_range(self, name: &str, range: NamedRange) -> Self {
        if let Ok(mut ranges) = self.named_ranges.write() {
            ranges.insert(name.to_string(), range);
        }
        self
    }

    /// Names of all sheets in creation order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets
            .read()
            .map(|sheets| sheets.iter().map(|s| s.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Copy of a sheet's values
    pub fn sheet_values(&self, name: &str) -> Option<Vec<Vec<String>>> {
        let sheets = self.sheets.read().ok()?;
        sheets
            .iter()
            .find(|s| same_name(&s.name, name))
            .map(|s| s.values.clone())
    }

    /// Remove a sheet, returning it if it existed
    pub fn remove_sheet(&self, name: &str) -> Result<Option<Sheet>, SheetError> {
        let mut sheets = write(&self.sheets)?;
        Ok(sheets
            .iter()
            .position(|s| same_name(&s.name, name))
            .map(|index| sheets.remove(index)))
    }

    /// Replace all values of an existing sheet
    pub fn replace_sheet_values(
        &self,
        name: &str,
        values: Vec<Vec<String>>,
    ) -> Result<(), SheetError> {
        let mut sheets = write(&self.sheets)?;
        let sheet = sheets
            .iter_mut()
            .find(|s| same_name(&s.name, name))
            .ok_or_else(|| SheetError::Storage(anyhow::anyhow!("Sheet \"{}\" not found", name)))?;
        sheet.values = values;
        Ok(())
    }

    /// Menus added so far
    pub fn menus(&self) -> Vec<Menu> {
        self.menus.read().map(|m| m.clone()).unwrap_or_default()
    }

    /// Snapshot of all sheets
    pub fn sheets(&self) -> Result<Vec<Sheet>, SheetError> {
        Ok(read(&self.sheets)?.clone())
    }

    /// Snapshot of all named ranges
    pub fn named_ranges(&self) -> Result<BTreeMap<String, NamedRange>, SheetError> {
        Ok(read(&self.named_ranges)?.clone())
    }
}

impl Default for InMemorySpreadsheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Spreadsheet for InMemorySpreadsheet {
    fn create_sheet_from_template(
        &self,
        new_sheet_name: &str,
        template_sheet_name: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetError> {
        validate_values(values)?;
        if new_sheet_name.trim().is_empty() {
            return Err(SheetError::InvalidValues("sheet name is empty".to_string()));
        }

        let mut sheets = write(&self.sheets)?;
        if sheets.iter().any(|s| same_name(&s.name, new_sheet_name)) {
            return Err(SheetError::NameConflict(new_sheet_name.to_string()));
        }

        let template = sheets
            .iter()
            .find(|s| same_name(&s.name, template_sheet_name))
            .ok_or_else(|| SheetError::TemplateNotFound(template_sheet_name.to_string()))?;

        let mut sheet = Sheet::new(new_sheet_name, template.values.clone());
        sheet.write_block(1, 1, values);
        sheets.push(sheet);
        Ok(())
    }

    fn write_values(
        &self,
        sheet_name: &str,
        row: usize,
        column: usize,
        values: &[Vec<String>],
    ) -> Result<(), SheetError> {
        validate_values(values)?;
        if row == 0 || column == 0 {
            return Err(SheetError::InvalidValues(
                "cell positions start at 1".to_string(),
            ));
        }

        let mut sheets = write(&self.sheets)?;
        let sheet = sheets
            .iter_mut()
            .find(|s| same_name(&s.name, sheet_name))
            .ok_or_else(|| {
                SheetError::Storage(anyhow::anyhow!("Sheet \"{}\" not found", sheet_name))
            })?;
        sheet.write_block(row, column, values);
        Ok(())
    }

    fn value_from_named_range(&self, range_name: &str) -> Result<String, SheetError> {
        let range = read(&self.named_ranges)?
            .get(range_name)
            .cloned()
            .ok_or_else(|| SheetError::NamedRangeNotFound(range_name.to_string()))?;

        let sheets = read(&self.sheets)?;
        Ok(sheets
            .iter()
            .find(|s| same_name(&s.name, &range.sheet))
            .map(|s| s.cell(range.row, range.column).to_string())
            .unwrap_or_default())
    }

    fn create_menu(&self, menu_name: &str, items: &[MenuItem]) -> Result<(), SheetError> {
        let mut menus = write(&self.menus)?;
        menus.retain(|m| m.name != menu_name);
        menus.push(Menu {
            name: menu_name.to_string(),
            items: items.to_vec(),
        });
        Ok(())
    }
}
