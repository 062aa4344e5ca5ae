//! Export of sheets to an .xlsx workbook

use anyhow::{Context, Result};
use log::info;
use rust_xlsxwriter::{Format, Workbook};
use std::collections::HashSet;
use std::path::Path;

use super::Sheet;

/// Excel worksheet maximum row count
const MAX_ROWS: usize = 1_048_576;
/// Excel worksheet maximum column count
const MAX_COLUMNS: usize = 16_384;
/// Excel sheet name maximum length
const MAX_SHEET_NAME_LEN: usize = 31;
/// Characters not allowed in sheet names
const ILLEGAL_SHEET_NAME_CHARS: [char; 7] = ['*', ':', '?', '/', '\\', '[', ']'];

/// Make a sheet name acceptable to Excel
///
/// Illegal characters become `_` and the result is cut to 31 characters.
/// Excel also rejects names that begin or end with an apostrophe, so those
/// are trimmed after the cut along with whitespace. Empty names become "Sheet".
pub fn sanitize_sheet_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| if ILLEGAL_SHEET_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let truncated: String = replaced.trim().chars().take(MAX_SHEET_NAME_LEN).collect();
    let trimmed = truncated.trim_matches(|c: char| c == '\'' || c.is_whitespace());
    if trimmed.is_empty() {
        return "Sheet".to_string();
    }
    trimmed.to_string()
}

/// Sanitized name not yet in `taken` (compared ignoring case), suffixed `~n` on clashes
fn unique_sheet_name(name: &str, taken: &mut HashSet<String>) -> String {
    let base = sanitize_sheet_name(name);
    let mut candidate = base.clone();
    let mut n = 1;
    while taken.contains(&candidate.to_lowercase()) {
        let suffix = format!("~{}", n);
        let keep = MAX_SHEET_NAME_LEN.saturating_sub(suffix.chars().count());
        candidate = format!("{}{}", base.chars().take(keep).collect::<String>(), suffix);
        n += 1;
    }
    taken.insert(candidate.to_lowercase());
    candidate
}

/// Write sheets to an .xlsx file, bolding each sheet's first row
pub fn export_xlsx(sheets: &[Sheet], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let mut taken = HashSet::new();

    for sheet in sheets {
        let width = sheet.values.iter().map(Vec::len).max().unwrap_or(0);
        if sheet.values.len() > MAX_ROWS || width > MAX_COLUMNS {
            anyhow::bail!(
                "Sheet \"{}\" is too large for xlsx ({} rows x {} columns)",
                sheet.name,
                sheet.values.len(),
                width
            );
        }

        let name = unique_sheet_name(&sheet.name, &mut taken);
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&name)
            .with_context(|| format!("Invalid sheet name: {}", name))?;

        for (r, row) in sheet.values.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if value.is_empty() {
                    continue;
                }
                let (r, c) = (r as u32, c as u16);
                if r == 0 {
                    worksheet.write_string_with_format(r, c, value, &header)?;
                } else {
                    worksheet.write_string(r, c, value)?;
                }
            }
        }
        if !sheet.values.is_empty() {
            worksheet.set_freeze_panes(1, 0)?;
        }
        worksheet.autofit();
    }

    workbook
        .save(path)
        .with_context(|| format!("Failed to write xlsx file: {}", path.display()))?;
    info!("Exported {} sheets to {}", sheets.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_sheet_name() {
        assert_eq!(
            sanitize_sheet_name("[10/18/26] Network code: 12345"),
            "_10_18_26_ Network code_ 12345"
        );
        assert_eq!(sanitize_sheet_name("   "), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40)).len(), 31);
        assert_eq!(sanitize_sheet_name("'Q3 users'"), "Q3 users");
        assert_eq!(sanitize_sheet_name("it's fine"), "it's fine");
        assert_eq!(sanitize_sheet_name("''"), "Sheet");
        assert_eq!(sanitize_sheet_name(" ' '' ' "), "Sheet");
        // The 31st character is an apostrophe after truncation
        assert_eq!(
            sanitize_sheet_name(&format!("{}'tail", "x".repeat(30))),
            "x".repeat(30)
        );
    }

    #[test]
    fn test_unique_sheet_name() {
        let mut taken = HashSet::new();
        let long = "[10/18/26] Network code: 1234567890";
        let first = unique_sheet_name(long, &mut taken);
        let second = unique_sheet_name(&format!("{} (1)", long), &mut taken);

        assert_eq!(first.chars().count(), 31);
        assert_eq!(second.chars().count(), 31);
        assert!(second.ends_with("~1"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_export_xlsx_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.xlsx");
        let sheets = vec![
            Sheet::new("[1/2/26] Network code: 1", vec![vec!["ID".to_string()], vec!["7".to_string()]]),
            Sheet::new("Empty", vec![]),
            Sheet::new("'Q3 users'", vec![vec!["Name".to_string()]]),
        ];

        export_xlsx(&sheets, &path).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
