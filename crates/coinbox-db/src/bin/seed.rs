//! # Seed Data Generator
//!
//! Populates a development database with printer profiles and print
//! function bindings, so the shell starts past the first-run wizard.
//!
//! ## Usage
//! ```bash
//! # Seed ./coinbox_dev.db
//! cargo run -p coinbox-db --bin seed
//!
//! # Specify database path
//! cargo run -p coinbox-db --bin seed -- --db ./data/coinbox.db
//! ```
//!
//! ## Generated Data
//! - Profiles: `receipt` (80mm roll), `kitchen` (80mm roll, 2 copies),
//!   `office` (A4 laser)
//! - Functions: `receipt` → receipt, `kitchen` → kitchen, `report` → ask
//! - Default printer: office

use std::env;

use coinbox_core::config::{keys, Config, ConfigHandle};
use coinbox_core::printing::{PrinterMode, PrinterSettings, Unit, NO_PRINTER};
use coinbox_db::{Database, DbConfig};
use serde_json::Value;

/// Profiles as (name, mode, paper size in mm, copies).
const PROFILES: &[(&str, PrinterMode, (f64, f64), i32)] = &[
    ("receipt", PrinterMode::ScreenResolution, (80.0, 200.0), 1),
    ("kitchen", PrinterMode::ScreenResolution, (80.0, 200.0), 2),
    ("office", PrinterMode::PrinterResolution, (210.0, 297.0), 1),
];

/// Function bindings; `None` means "ask every time".
const FUNCTIONS: &[(&str, Option<&str>)] = &[
    ("receipt", Some("receipt")),
    ("kitchen", Some("kitchen")),
    ("report", None),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./coinbox_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Coinbox POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./coinbox_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Coinbox POS Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let config = ConfigHandle::default();
    db.config().load_into(&config).await?;
    if !config.read(Config::is_first_run) {
        println!("⚠ Database already has configuration");
        println!("  Skipping seed to avoid overwriting it.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    for (name, mode, paper_size, copies) in PROFILES {
        let mut settings = PrinterSettings::new(*mode);
        settings.printer_name = name.to_string();
        settings.set_paper_size(*paper_size, Unit::Millimeter);
        settings.set_copy_count(*copies)?;
        let record = serde_json::to_value(settings.to_record())?;

        let key = format!("{}{}", keys::PRINTER_PREFIX, name);
        config.write(|c| c.set(keys::PRINTING, &key, record));
        println!("  Profile '{}' ({} copies)", name, copies);
    }

    for (function, printer) in FUNCTIONS {
        let binding = match printer {
            Some(name) => Value::from(*name),
            None => Value::from(NO_PRINTER),
        };

        let key = format!("{}{}", keys::FUNCTION_PREFIX, function);
        config.write(|c| c.set(keys::PRINTING, &key, binding));
        println!("  Function '{}' → {}", function, printer.unwrap_or("ask"));
    }

    config.write(|c| {
        c.set(keys::PRINTING, keys::DEFAULT_PRINTER, "office");
        c.complete_first_run();
    });
    db.config().save_from(&config).await?;

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
