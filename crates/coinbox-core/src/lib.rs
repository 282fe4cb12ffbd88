//! # coinbox-core: View-Model Logic for Coinbox POS
//!
//! This crate holds everything in the base module that does not touch a
//! database, a file or a widget toolkit.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coinbox Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Desktop shell (apps/desktop)                 │   │
//! │  │    Modules ──► Menu ──► Main Window ──► UI Handler / Wizard    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ coinbox-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  config   │  │ printing  │  │   form    │  │  catalog  │  │   │
//! │  │   │  Config   │  │ Manager   │  │ Controller│  │  browse   │  │   │
//! │  │   │  defaults │  │ Jobs      │  │ FormPage  │  │  search   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO TOOLKIT                             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    coinbox-db (Database Layer)                  │   │
//! │  │        SQLite, migrations, config table, stored files           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - Section/key settings with defaults and change tracking
//! - [`printing`] - Printer profiles, print functions, print jobs
//! - [`form`] - Generic list/detail forms over a controller
//! - [`catalog`] - Hierarchical browse and search
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! Dialogs and print output are reached through traits
//! ([`printing::PrintDialogs`], [`printing::PrintBackend`]) so the same
//! logic runs under a toolkit, headless, or in tests.
//!
//! ## Example Usage
//!
//! ```rust
//! use coinbox_core::config::{Config, ConfigHandle};
//! use coinbox_core::printing::{TablePrintJob, PrintJob};
//!
//! let config = ConfigHandle::new(Config::new());
//! config.write(|c| c.set("printing", "force_preview", true));
//! assert!(config.read(|c| c.force_preview()));
//!
//! let job = TablePrintJob::new(
//!     Some(vec![vec!["Coffee".into(), "2".into()]]),
//!     Some(vec!["Item".into(), "Qty".into()]),
//!     None,
//! );
//! assert_eq!(job.table().row_count(), 2);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod printing;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use config::{Config, ConfigHandle};
pub use error::{FormError, FormResult, PrintingError, PrintingResult, ValidationError};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Application name shown in window titles.
pub const APP_NAME: &str = "Coinbox";

/// Status bar message once the main window is up.
pub const READY_MESSAGE: &str = "Coinbox POS is ready.";
