//! # Repository Module
//!
//! Database repository implementations for Coinbox.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Desktop shell                                                         │
//! │       │                                                                 │
//! │       │  db.stored_files().materialize(&logo)                          │
//! │       ▼                                                                 │
//! │  StoredFileRepository / ConfigRepository                               │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ConfigRepository`] - Config table load/save
//! - [`StoredFileRepository`] - Binary assets and the on-disk cache

pub mod config;
pub mod stored_file;

pub use config::ConfigRepository;
pub use stored_file::{NewStoredFile, StoredFile, StoredFileRepository, StoredFileUpdate};
