//! Spreadsheet-facing entry points
//!
//! Wires the fetcher and the exporter to a spreadsheet: configuration comes
//! from named ranges, the menu exposes the export, and triggers are looked
//! up by name through a [`TriggerRegistry`].

mod triggers;

pub use triggers::{Trigger, TriggerError, TriggerRegistry};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;

use crate::api::{AccessTokenProvider, AdManagerClient};
use crate::export::export_users;
use crate::models::NetworkCode;
use crate::sheets::{MenuItem, Spreadsheet};
use crate::users::UserHandler;

/// Sheet copied for every export
pub const TEMPLATE_SHEET: &str = "USER_LIST_TEMPLATE";
pub const NAMED_RANGE_NETWORK_CODE: &str = "NETWORK_CODE";
pub const NAMED_RANGE_API_VERSION: &str = "API_VERSION";
/// Application name reported to the API
pub const APPLICATION_NAME: &str = "gam_user_list";

pub const MENU_NAME: &str = "Ad Manager";
pub const EXPORT_USERS_ITEM: &str = "Export users";

pub const ON_OPEN_TRIGGER: &str = "onOpen";
pub const EXPORT_USERS_TRIGGER: &str = "onExportUsersSelected";

/// Add the "Ad Manager" menu to the spreadsheet
pub fn create_menu(spreadsheet: &dyn Spreadsheet) -> Result<()> {
    spreadsheet.create_menu(
        MENU_NAME,
        &[MenuItem::new(EXPORT_USERS_ITEM, EXPORT_USERS_TRIGGER)],
    )?;
    Ok(())
}

/// Runs when the spreadsheet is opened
pub fn on_open(spreadsheet: &dyn Spreadsheet) -> Result<()> {
    create_menu(spreadsheet)
}

/// Build a user handler from the spreadsheet's named-range configuration
pub fn create_user_handler(
    spreadsheet: &dyn Spreadsheet,
    auth: Arc<dyn AccessTokenProvider>,
) -> Result<UserHandler> {
    let network_code = spreadsheet.value_from_named_range(NAMED_RANGE_NETWORK_CODE)?;
    let api_version = spreadsheet.value_from_named_range(NAMED_RANGE_API_VERSION)?;

    let client = AdManagerClient::new(
        auth,
        APPLICATION_NAME,
        NetworkCode::new(network_code.trim()),
        api_version,
    )?;
    let service = client
        .get_service("UserService")
        .context("Failed to create UserService")?;
    Ok(UserHandler::new(Box::new(service)))
}

/// Date shown in sheet names: `M/d/yy` in UTC
pub fn export_date_string(now: DateTime<Utc>) -> String {
    now.format("%-m/%-d/%y").to_string()
}

/// Name of the sheet an export is written to (before collision suffixes)
pub fn export_sheet_base_name(date_string: &str, network_code: &NetworkCode) -> String {
    format!("[{}] Network code: {}", date_string, network_code)
}

/// Export every user of the handler's network into a new sheet
///
/// Returns the name of the created sheet.
pub fn on_export_users_selected(
    spreadsheet: &dyn Spreadsheet,
    user_handler: &UserHandler,
    date_string: &str,
) -> Result<String> {
    let users = user_handler.get_all_users()?;
    let base_name = export_sheet_base_name(date_string, user_handler.network_code());
    let sheet_name = export_users(spreadsheet, &users, &base_name, TEMPLATE_SHEET)?;
    Ok(sheet_name)
}

/// Register the spreadsheet's triggers
///
/// `make_user_handler` runs on each export so configuration is read at the
/// moment the user asks for it.
pub fn register_triggers<'a, F>(
    registry: &mut TriggerRegistry<'a>,
    spreadsheet: &'a dyn Spreadsheet,
    make_user_handler: F,
) where
    F: Fn() -> Result<UserHandler> + 'a,
{
    registry.register(ON_OPEN_TRIGGER, move || on_open(spreadsheet));
    registry.register(EXPORT_USERS_TRIGGER, move || {
        let user_handler = make_user_handler()?;
        let date_string = export_date_string(Utc::now());
        let sheet_name = on_export_users_selected(spreadsheet, &user_handler, &date_string)?;
        info!("Users exported to \"{}\"", sheet_name);
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Statement, StaticToken};
    use crate::models::{User, UserPage};
    use crate::sheets::{InMemorySpreadsheet, NamedRange, SheetError};
    use crate::users::UserService;
    use chrono::TimeZone;

    struct FixedUsers(Vec<User>, NetworkCode);

    impl UserService for FixedUsers {
        fn network_code(&self) -> &NetworkCode {
            &self.1
        }

        fn get_users_by_statement(&self, _statement: &Statement) -> Result<Option<UserPage>> {
            Ok(Some(UserPage {
                total_result_set_size: self.0.len() as i64,
                start_index: 0,
                results: Some(self.0.clone()),
            }))
        }
    }

    fn test_users() -> Vec<User> {
        vec![
            User::new(1, "user1", "user1@", "role1", true),
            User::new(2, "user2", "user2@", "role2", false),
        ]
    }

    fn expected_values() -> Vec<Vec<String>> {
        [
            ["ID", "Name", "Email", "Role", "Active"],
            ["1", "user1", "user1@", "role1", "true"],
            ["2", "user2", "user2@", "role2", "false"],
        ]
        .iter()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .collect()
    }

    fn handler() -> UserHandler {
        UserHandler::new(Box::new(FixedUsers(
            test_users(),
            NetworkCode::new("NETWORK_CODE"),
        )))
    }

    fn spreadsheet() -> InMemorySpreadsheet {
        InMemorySpreadsheet::new().with_sheet(TEMPLATE_SHEET, vec![vec!["ID".to_string()]])
    }

    #[test]
    fn test_create_menu() {
        let sheets = spreadsheet();
        create_menu(&sheets).unwrap();

        let menus = sheets.menus();
        assert_eq!(menus.len(), 1);
        assert_eq!(menus[0].name, "Ad Manager");
        assert_eq!(
            menus[0].items,
            vec![MenuItem::new("Export users", "onExportUsersSelected")]
        );
    }

    #[test]
    fn test_export_creates_sheet_with_name_and_values() {
        let sheets = spreadsheet();
        let name = on_export_users_selected(&sheets, &handler(), "DATE_STRING").unwrap();

        assert_eq!(name, "[DATE_STRING] Network code: NETWORK_CODE");
        assert_eq!(sheets.sheet_values(&name).unwrap(), expected_values());
    }

    #[test]
    fn test_export_increments_sheet_name() {
        let sheets = spreadsheet()
            .with_sheet("[DATE_STRING] Network code: NETWORK_CODE", vec![])
            .with_sheet("[DATE_STRING] Network code: NETWORK_CODE (1)", vec![]);

        let name = on_export_users_selected(&sheets, &handler(), "DATE_STRING").unwrap();

        assert_eq!(name, "[DATE_STRING] Network code: NETWORK_CODE (2)");
        assert_eq!(sheets.sheet_values(&name).unwrap(), expected_values());
    }

    #[test]
    fn test_export_date_string() {
        let date = Utc.with_ymd_and_hms(2026, 3, 7, 23, 59, 0).unwrap();
        assert_eq!(export_date_string(date), "3/7/26");

        let date = Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 0).unwrap();
        assert_eq!(export_date_string(date), "12/25/24");
    }

    #[test]
    fn test_create_user_handler_reads_named_ranges() {
        let sheets = InMemorySpreadsheet::new()
            .with_sheet(
                "Settings",
                vec![vec![" 12345 ".to_string(), "v202405".to_string()]],
            )
            .with_named_range(NAMED_RANGE_NETWORK_CODE, NamedRange::new("Settings", 1, 1))
            .with_named_range(NAMED_RANGE_API_VERSION, NamedRange::new("Settings", 1, 2));

        let handler = create_user_handler(&sheets, Arc::new(StaticToken::new("t"))).unwrap();
        assert_eq!(handler.network_code().as_str(), "12345");
    }

    #[test]
    fn test_create_user_handler_missing_named_range() {
        let sheets = InMemorySpreadsheet::new();
        let err = create_user_handler(&sheets, Arc::new(StaticToken::new("t")))
            .err()
            .unwrap();

        assert_eq!(err.to_string(), "Range NETWORK_CODE not found.");
        assert!(matches!(
            err.downcast_ref::<SheetError>(),
            Some(SheetError::NamedRangeNotFound(_))
        ));
    }

    #[test]
    fn test_registered_triggers() {
        let sheets = spreadsheet();
        let mut registry = TriggerRegistry::new();
        register_triggers(&mut registry, &sheets, || Ok(handler()));

        registry.invoke(ON_OPEN_TRIGGER).unwrap();
        assert_eq!(sheets.menus()[0].name, MENU_NAME);

        registry.invoke(EXPORT_USERS_TRIGGER).unwrap();
        let names = sheets.sheet_names();
        assert_eq!(names.len(), 2);
        assert!(names[1].ends_with("] Network code: NETWORK_CODE"));
    }

    #[test]
    fn test_export_trigger_propagates_config_errors() {
        let sheets = spreadsheet();
        let mut registry = TriggerRegistry::new();
        register_triggers(&mut registry, &sheets, || {
            create_user_handler(&sheets, Arc::new(StaticToken::new("t")))
        });

        let err = registry.invoke(EXPORT_USERS_TRIGGER).unwrap_err();
        assert_eq!(err.root_cause().to_string(), "Range NETWORK_CODE not found.");
        assert_eq!(sheets.sheet_names(), vec![TEMPLATE_SHEET]);
    }
}
