//! gam-user-list - Export Ad Manager users into a spreadsheet workbook
//!
//! This is the host for the workbook's triggers: it opens the workbook,
//! registers the triggers and runs the one named on the command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use admanager::app::{
    EXPORT_USERS_TRIGGER, NAMED_RANGE_API_VERSION, NAMED_RANGE_NETWORK_CODE, ON_OPEN_TRIGGER,
    TEMPLATE_SHEET,
};
use admanager::export::HEADER;
use admanager::sheets::{NamedRange, Sheet, WorkbookDocument, WorkbookFile};
use admanager::{AdManagerCredentials, TriggerRegistry, create_user_handler, load_token_provider};

/// Workbook filename in the config directory
const DEFAULT_WORKBOOK: &str = "workbook.json";
/// Sheet holding the named-range configuration in new workbooks
const SETTINGS_SHEET: &str = "Settings";

#[derive(Parser, Debug)]
#[command(name = "gam-user-list")]
#[command(about = "Exports Ad Manager users into a new sheet of a workbook")]
struct Cli {
    /// Path to the workbook (defaults to workbook.json in the config directory)
    #[arg(short, long, global = true)]
    workbook: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a workbook with settings and the user list template
    Init {
        /// Ad Manager network code
        #[arg(long)]
        network_code: String,
        /// Ad Manager API version, e.g. v202405
        #[arg(long)]
        api_version: String,
    },
    /// Run the open trigger and show the resulting menus
    Open,
    /// Export all users into a new sheet
    Export {
        /// Also render the workbook as .xlsx at this path
        #[arg(long)]
        xlsx: Option<PathBuf>,
    },
    /// Invoke a trigger by name (as referenced from menu items)
    Run {
        /// Trigger name, e.g. onExportUsersSelected
        trigger: String,
    },
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        warn!("Failed to initialize config directory: {}", e);
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let workbook_path = match cli.workbook {
        Some(path) => path,
        None => config::config_path(DEFAULT_WORKBOOK)
            .context("Could not determine config directory")?,
    };

    match cli.command {
        Command::Init {
            network_code,
            api_version,
        } => init_workbook(&workbook_path, &network_code, &api_version),
        Command::Open => with_triggers(&workbook_path, |registry, workbook| {
            registry.invoke(ON_OPEN_TRIGGER)?;
            for menu in workbook.spreadsheet().menus() {
                println!("{}", menu.name);
                for item in menu.items {
                    println!("  {} -> {}", item.item_name, item.function_name);
                }
            }
            Ok(())
        }),
        Command::Export { xlsx } => with_triggers(&workbook_path, |registry, workbook| {
            registry.invoke(EXPORT_USERS_TRIGGER)?;
            if let Some(xlsx) = xlsx {
                workbook.export_xlsx(&xlsx)?;
            }
            Ok(())
        }),
        Command::Run { trigger } => {
            with_triggers(&workbook_path, |registry, _| registry.invoke(&trigger))
        }
    }
}

/// Open the workbook, register its triggers and hand both to `f`
fn with_triggers<F>(workbook_path: &Path, f: F) -> Result<()>
where
    F: FnOnce(&TriggerRegistry<'_>, &WorkbookFile) -> Result<()>,
{
    let workbook = WorkbookFile::open(workbook_path)?;
    let mut registry = TriggerRegistry::new();
    admanager::register_triggers(&mut registry, &workbook, || {
        let auth = load_token_provider().inspect_err(|_| {
            if let Some(path) = AdManagerCredentials::default_credentials_path() {
                warn!(
                    "To configure Ad Manager access, either:\n\
                     1. Set ADMANAGER_ACCESS_TOKEN to an access token\n\
                     2. Place client_id, client_secret and refresh_token in: {}\n\
                     3. Or set ADMANAGER_CLIENT_ID, ADMANAGER_CLIENT_SECRET and ADMANAGER_REFRESH_TOKEN",
                    path.display()
                );
            }
        })?;
        create_user_handler(&workbook, auth)
    });

    f(&registry, &workbook)
}

/// Write a fresh workbook with configuration named ranges and the template sheet
fn init_workbook(path: &Path, network_code: &str, api_version: &str) -> Result<()> {
    if path.exists() {
        anyhow::bail!("Workbook already exists: {}", path.display());
    }

    let mut document = WorkbookDocument::default();
    document.sheets.push(Sheet::new(
        SETTINGS_SHEET,
        vec![
            vec!["Network code".to_string(), network_code.to_string()],
            vec!["API version".to_string(), api_version.to_string()],
        ],
    ));
    document.sheets.push(Sheet::new(
        TEMPLATE_SHEET,
        vec![HEADER.iter().map(|h| h.to_string()).collect()],
    ));
    document.named_ranges.insert(
        NAMED_RANGE_NETWORK_CODE.to_string(),
        NamedRange::new(SETTINGS_SHEET, 1, 2),
    );
    document.named_ranges.insert(
        NAMED_RANGE_API_VERSION.to_string(),
        NamedRange::new(SETTINGS_SHEET, 2, 2),
    );

    WorkbookFile::from_document(path, document).save()?;
    info!("Created workbook {}", path.display());
    Ok(())
}
