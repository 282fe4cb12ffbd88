//! # Coinbox Desktop Library
//!
//! The application shell of Coinbox POS: module system, window view models
//! and the wiring between them, the printer registry and the database.
//!
//! ## Module Organization
//! ```text
//! coinbox_desktop_lib/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── context.rs      ◄─── AppContext, Services
//! ├── module.rs       ◄─── Module trait, BaseModule
//! ├── events.rs       ◄─── Event bus (exit, printing signals)
//! ├── backend.rs      ◄─── Headless print backend and dialogs
//! ├── state/
//! │   ├── db.rs       ◄─── Database + runtime handle
//! │   ├── config.rs   ◄─── Config handle + store
//! │   └── printing.rs ◄─── Shared printer registry
//! ├── shell/
//! │   ├── ui.rs       ◄─── UiHandler, window chain
//! │   ├── window.rs   ◄─── MainWindow, extensions
//! │   ├── wizard.rs   ◄─── FirstTimeWizard
//! │   ├── menu.rs     ◄─── Menu roots, items, actions
//! │   ├── page.rs     ◄─── Tab pages
//! │   └── config_pages.rs ◄─── Application/Menu/Locale/Printing pages
//! └── error.rs        ◄─── AppError for the user
//! ```

pub mod backend;
pub mod context;
pub mod error;
pub mod events;
pub mod module;
pub mod shell;
pub mod state;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use directories::ProjectDirs;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use backend::{HeadlessDialogs, TextFileBackend};
use coinbox_core::ConfigHandle;
use coinbox_db::{Database, DbConfig};
use context::AppContext;
use module::{BaseModule, Module};
use shell::FirstTimeWizard;
use state::{ConfigState, DbState};

/// Runs the application until its windows are closed.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter (RUST_LOG)                     │
/// │                                                                         │
/// │  2. Connect to Database ──────────────────────────────────────────────► │
/// │     • COINBOX_DB_PATH or the platform data dir                          │
/// │     • COINBOX_CACHE_DIR for materialized stored files                   │
/// │     • Run pending migrations                                            │
/// │                                                                         │
/// │  3. Load Configuration ───────────────────────────────────────────────► │
/// │     • config table → ConfigHandle (empty table = first run)             │
/// │                                                                         │
/// │  4. Bootstrap Modules ────────────────────────────────────────────────► │
/// │     • defaults, menu, printer registry, bus subscriptions               │
/// │                                                                         │
/// │  5. Start UI ─────────────────────────────────────────────────────────► │
/// │     • first run: wizard (accepted headless), then main window           │
/// │     • close main window → state saved                                   │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
///
/// ## Returns
/// The process exit code.
pub fn run() -> i32 {
    init_tracing();

    info!("Starting Coinbox POS");

    match run_app() {
        Ok(()) => 0,
        Err(e) => {
            error!(error = %e, "Coinbox POS failed");
            1
        }
    }
}

/// Modules loaded by the binary, in load order.
pub fn modules() -> Vec<Box<dyn Module>> {
    vec![Box::new(BaseModule)]
}

fn run_app() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;

    let db_path = get_database_path()?;
    info!(?db_path, "Database path determined");

    let mut db_config = DbConfig::new(&db_path);
    if let Ok(dir) = std::env::var("COINBOX_CACHE_DIR") {
        db_config = db_config.cache_dir(dir);
    }
    let db = runtime.block_on(Database::new(db_config))?;
    info!("Database connected and migrations applied");

    let db_state = DbState::new(db, runtime.handle().clone());
    let handle = ConfigHandle::default();
    db_state.block_on(db_state.inner().config().load_into(&handle))?;
    let config = ConfigState::new(handle, Arc::new(db_state.clone()));

    let mut ctx = AppContext::bootstrap(
        modules(),
        config,
        Box::new(HeadlessDialogs),
        Box::new(TextFileBackend::new(printout_dir(&db_path))),
    )?;

    if !ctx.start()? {
        info!("Nothing to show");
        return Ok(());
    }

    // No one to answer the wizard: accept it.
    while ctx.ui().current::<FirstTimeWizard>().is_some() && !ctx.should_terminate() {
        ctx.finish_wizard(true)?;
    }

    if let Some(window) = ctx.ui().main_window() {
        info!(tabs = window.tabs().len(), status = %window.status(), "Main window ready");
    }

    ctx.shutdown()?;
    db_state.block_on(db_state.inner().close());
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=coinbox=trace` - Show trace for coinbox crates only
/// - Default: INFO level
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,coinbox=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/org.coinbox.pos/coinbox.db`
/// - **Windows**: `%APPDATA%\coinbox\pos\coinbox.db`
/// - **Linux**: `~/.local/share/pos/coinbox.db`
///
/// ## Development Override
/// Set `COINBOX_DB_PATH` environment variable to use a custom path.
fn get_database_path() -> Result<PathBuf, Box<dyn Error>> {
    if let Ok(path) = std::env::var("COINBOX_DB_PATH") {
        return Ok(PathBuf::from(path));
    }

    let proj_dirs = ProjectDirs::from("org", "coinbox", "pos")
        .ok_or("Could not determine app data directory")?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("coinbox.db"))
}

/// Printed documents land next to the database.
fn printout_dir(db_path: &Path) -> PathBuf {
    db_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("printouts")
}
