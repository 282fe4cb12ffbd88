//! # Coinbox Desktop Entry Point
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Determine database path (app data directory)
//! 3. Connect to database & run migrations
//! 4. Load the configuration
//! 5. Bootstrap the modules
//! 6. Show the first-time wizard or the main window

// Prevents an additional console window on Windows in release
#![cfg_attr(
    all(not(debug_assertions), target_os = "windows"),
    windows_subsystem = "windows"
)]

fn main() {
    // The actual setup is in lib.rs for better testability
    std::process::exit(coinbox_desktop_lib::run());
}
