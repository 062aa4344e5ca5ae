//! Sheet name collision resolution

use log::{debug, warn};

use super::ExportError;
use crate::sheets::Spreadsheet;

/// Upper bound on creation attempts for one base name
pub const MAX_SHEET_NAME_ATTEMPTS: usize = 100;

/// Name tried on a given attempt: `base`, then `base (1)`, `base (2)`, ...
pub fn candidate_sheet_name(base_name: &str, attempt: usize) -> String {
    if attempt == 0 {
        base_name.to_string()
    } else {
        format!("{} ({})", base_name, attempt)
    }
}

/// Create a sheet from a template under the first free candidate name
///
/// Availability is never checked up front: a name is taken to be free when
/// creation succeeds. Only name conflicts move on to the next candidate;
/// any other failure is returned immediately.
pub fn create_sheet_with_unique_name(
    spreadsheet: &dyn Spreadsheet,
    base_name: &str,
    template_name: &str,
    values: &[Vec<String>],
) -> Result<String, ExportError> {
    for attempt in 0..MAX_SHEET_NAME_ATTEMPTS {
        let sheet_name = candidate_sheet_name(base_name, attempt);
        match spreadsheet.create_sheet_from_template(&sheet_name, template_name, values) {
            Ok(()) => {
                debug!("Created sheet \"{}\" on attempt {}", sheet_name, attempt);
                return Ok(sheet_name);
            }
            Err(e) if e.is_name_conflict() => {
                warn!("Sheet \"{}\" already exists, trying next name", sheet_name);
            }
            Err(source) => return Err(ExportError::CreateSheet { sheet_name, source }),
        }
    }

    Err(ExportError::SheetNamesExhausted {
        base_name: base_name.to_string(),
        attempts: MAX_SHEET_NAME_ATTEMPTS,
    })
}
