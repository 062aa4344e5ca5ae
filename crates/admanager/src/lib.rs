//! Ad Manager crate - user list export
//!
//! This crate provides:
//! - Domain models (User, UserPage, NetworkCode)
//! - Ad Manager API client, token providers and PQL statements
//! - Paginated user fetching
//! - Spreadsheet trait abstractions (in-memory, JSON workbook, xlsx export)
//! - The export orchestrator with sheet-name collision handling
//! - Named triggers for the spreadsheet menu
//!
//! Everything is synchronous; the binary in `apps/user-list` drives it.

pub mod api;
pub mod app;
pub mod config;
pub mod export;
pub mod models;
pub mod sheets;
pub mod users;

pub use api::{
    AccessTokenProvider, AdManagerClient, AdManagerService, ApiError, BindValue,
    RefreshTokenAuth, Statement, StatementBuilder, StaticToken,
};
pub use app::{
    TriggerRegistry, create_menu, create_user_handler, export_date_string,
    on_export_users_selected, on_open, register_triggers,
};
pub use config::{AdManagerCredentials, load_token_provider};
pub use export::{ExportError, UserTable, export_users};
pub use models::{NetworkCode, User, UserPage};
pub use sheets::{
    InMemorySpreadsheet, MenuItem, NamedRange, SheetError, Spreadsheet, WorkbookDocument,
    WorkbookFile,
};
pub use users::{UserHandler, UserService};
