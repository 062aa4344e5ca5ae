//! Workbook persisted as a JSON document
//!
//! The document holds sheets and named ranges. Every mutation is written
//! back to disk through a temp file and rename, so a crash never leaves a
//! half-written workbook. A mutation whose save fails is undone in memory.

use anyhow::Context;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{InMemorySpreadsheet, MenuItem, NamedRange, Sheet, SheetError, Spreadsheet};

/// On-disk workbook format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkbookDocument {
    #[serde(default)]
    pub named_ranges: BTreeMap<String, NamedRange>,
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

/// Spreadsheet backed by a JSON workbook file
pub struct WorkbookFile {
    path: PathBuf,
    inner: InMemorySpreadsheet,
}

impl WorkbookFile {
    /// Load a workbook from disk
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let document: WorkbookDocument = config::load_json_file(&path)?;
        debug!(
            "Opened workbook {} ({} sheets)",
            path.display(),
            document.sheets.len()
        );
        Ok(Self::from_document(path, document))
    }

    /// Wrap a document that will be saved to `path`
    pub fn from_document(path: impl Into<PathBuf>, document: WorkbookDocument) -> Self {
        Self {
            path: path.into(),
            inner: InMemorySpreadsheet::from_parts(document.sheets, document.named_ranges),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// In-memory view of the workbook (menus, sheet listings)
    pub fn spreadsheet(&self) -> &InMemorySpreadsheet {
        &self.inner
    }

    /// Current contents as a document
    pub fn document(&self) -> anyhow::Result<WorkbookDocument> {
        Ok(WorkbookDocument {
            named_ranges: self.inner.named_ranges()?,
            sheets: self.inner.sheets()?,
        })
    }

    /// Write the workbook to its path atomically
    pub fn save(&self) -> anyhow::Result<()> {
        let document = self.document()?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        config::save_json_file(&tmp, &document)?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace workbook: {}", self.path.display()))?;
        debug!("Saved workbook {}", self.path.display());
        Ok(())
    }

    /// Render every sheet into an .xlsx file
    pub fn export_xlsx(&self, path: &Path) -> anyhow::Result<()> {
        super::export_xlsx(&self.inner.sheets()?, path)
    }
}

impl Spreadsheet for WorkbookFile {
    fn create_sheet_from_template(
        &self,
        new_sheet_name: &str,
        template_sheet_name: &str,
        values: &[Vec<String>],
    ) -> Result<(), SheetError> {
        self.inner
            .create_sheet_from_template(new_sheet_name, template_sheet_name, values)?;
        if let Err(e) = self.save() {
            warn!("Rolling back sheet \"{}\" after failed save", new_sheet_name);
            self.inner.remove_sheet(new_sheet_name)?;
            return Err(e.into());
        }
        Ok(())
    }

    fn write_values(
        &self,
        sheet_name: &str,
        row: usize,
        column: usize,
        values: &[Vec<String>],
    ) -> Result<(), SheetError> {
        let previous = self.inner.sheet_values(sheet_name);
        self.inner.write_values(sheet_name, row, column, values)?;
        if let Err(e) = self.save() {
            warn!("Rolling back write to \"{}\" after failed save", sheet_name);
            if let Some(previous) = previous {
                self.inner.replace_sheet_values(sheet_name, previous)?;
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn value_from_named_range(&self, range_name: &str) -> Result<String, SheetError> {
        self.inner.value_from_named_range(range_name)
    }

    fn create_menu(&self, menu_name: &str, items: &[MenuItem]) -> Result<(), SheetError> {
        self.inner.create_menu(menu_name, items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    fn write_fixture(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("workbook.json");
        let json = r#"{
            "named_ranges": {
                "NETWORK_CODE": {"sheet": "Settings", "row": 1, "column": 2}
            },
            "sheets": [
                {"name": "Settings", "values": [["Network code", "12345"]]},
                {"name": "USER_LIST_TEMPLATE", "values": [["ID", "Name"]]}
            ]
        }"#;
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_open_and_read_named_range() {
        let dir = TempDir::new().unwrap();
        let workbook = WorkbookFile::open(write_fixture(&dir)).unwrap();

        assert_eq!(workbook.value_from_named_range("NETWORK_CODE").unwrap(), "12345");
        assert_eq!(
            workbook.spreadsheet().sheet_names(),
            vec!["Settings", "USER_LIST_TEMPLATE"]
        );
    }

    #[test]
    fn test_created_sheet_is_persisted() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        let workbook = WorkbookFile::open(&path).unwrap();

        workbook
            .create_sheet_from_template("Export", "USER_LIST_TEMPLATE", &[row(&["1", "a"])])
            .unwrap();

        let reopened = WorkbookFile::open(&path).unwrap();
        assert_eq!(
            reopened.spreadsheet().sheet_values("Export").unwrap(),
            vec![row(&["1", "a"])]
        );
        assert!(!dir.path().join("workbook.json.tmp").exists());
    }

    #[test]
    fn test_failed_create_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = write_fixture(&dir);
        let before = std::fs::read_to_string(&path).unwrap();
        let workbook = WorkbookFile::open(&path).unwrap();

        let err = workbook
            .create_sheet_from_template("Settings", "USER_LIST_TEMPLATE", &[row(&["1"])])
            .unwrap_err();

        assert!(err.is_name_conflict());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    /// Workbook whose path cannot be written: its parent is a regular file
    fn unsaveable(dir: &TempDir) -> WorkbookFile {
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let document = WorkbookDocument {
            named_ranges: BTreeMap::new(),
            sheets: vec![Sheet::new("USER_LIST_TEMPLATE", vec![row(&["ID", "Name"])])],
        };
        WorkbookFile::from_document(blocker.join("workbook.json"), document)
    }

    #[test]
    fn test_failed_save_rolls_back_created_sheet() {
        let dir = TempDir::new().unwrap();
        let workbook = unsaveable(&dir);

        let err = workbook
            .create_sheet_from_template("Export", "USER_LIST_TEMPLATE", &[row(&["1", "a"])])
            .unwrap_err();

        assert!(matches!(err, SheetError::Storage(_)));
        assert_eq!(workbook.spreadsheet().sheet_names(), vec!["USER_LIST_TEMPLATE"]);
    }

    #[test]
    fn test_failed_save_rolls_back_written_values() {
        let dir = TempDir::new().unwrap();
        let workbook = unsaveable(&dir);

        let err = workbook
            .write_values("USER_LIST_TEMPLATE", 2, 1, &[row(&["1", "a"])])
            .unwrap_err();

        assert!(matches!(err, SheetError::Storage(_)));
        assert_eq!(
            workbook.spreadsheet().sheet_values("USER_LIST_TEMPLATE").unwrap(),
            vec![row(&["ID", "Name"])]
        );
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(WorkbookFile::open(dir.path().join("missing.json")).is_err());
    }
}
