//! # coinbox-db: Database Layer for Coinbox POS
//!
//! This crate provides database access for Coinbox.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Coinbox Data Flow                                │
//! │                                                                         │
//! │  Desktop shell (bootstrap, config pages, wizard)                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     coinbox-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │ SqlitePool    │◄───│ ConfigRepo     │   │ 001_init.sql │  │   │
//! │  │   │ cache_dir     │    │ StoredFileRepo │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                  │                              │
//! │       ▼                                  ▼                              │
//! │  SQLite database                   <cache_dir>/<id><filetype>          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Config table and stored files
//!
//! ## Usage
//!
//! ```rust,ignore
//! use coinbox_core::ConfigHandle;
//! use coinbox_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/coinbox.db")).await?;
//!
//! let config = ConfigHandle::default();
//! db.config().load_into(&config).await?;
//! // ... edit settings ...
//! db.config().save_from(&config).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::config::ConfigRepository;
pub use repository::stored_file::{
    NewStoredFile, StoredFile, StoredFileRepository, StoredFileUpdate,
};
