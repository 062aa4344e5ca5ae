//! User list export
//!
//! Turns fetched users into a text table and writes it into a new sheet,
//! renaming the sheet until its name no longer collides.

mod resolver;
mod table;

pub use resolver::{MAX_SHEET_NAME_ATTEMPTS, candidate_sheet_name, create_sheet_with_unique_name};
pub use table::{HEADER, UserTable};

use log::info;

use crate::models::User;
use crate::sheets::{SheetError, Spreadsheet};

/// Errors from an export run
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("No free sheet name for \"{base_name}\" after {attempts} attempts")]
    SheetNamesExhausted { base_name: String, attempts: usize },
    #[error("Failed to create sheet \"{sheet_name}\"")]
    CreateSheet {
        sheet_name: String,
        #[source]
        source: SheetError,
    },
}

/// Write `users` into a new sheet copied from `template_name`
///
/// Returns the name the sheet was created under.
pub fn export_users(
    spreadsheet: &dyn Spreadsheet,
    users: &[User],
    base_name: &str,
    template_name: &str,
) -> Result<String, ExportError> {
    let table = UserTable::from_users(users);
    let sheet_name =
        create_sheet_with_unique_name(spreadsheet, base_name, template_name, table.rows())?;
    info!(
        "Exported {} users to sheet \"{}\"",
        table.data_len(),
        sheet_name
    );
    Ok(sheet_name)
}
